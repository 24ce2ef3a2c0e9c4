//! Native formatter loading - platform dynamic linking
//!
//! Thin wrapper over dlopen/LoadLibraryW that resolves the exported
//! formatting entry point and hands it back as a typed cdecl pointer.

use core::ffi::c_void;
use core::ptr::NonNull;

use super::output::WideBuffer;
use super::NativeFormatter;
use crate::error::Error;
use crate::marshal::ArgRecord;

/// Exported cdecl signature of the native formatting engine:
/// (output buffer, capacity in UTF-16 units, record count, first record)
pub type FormatFn = unsafe extern "C" fn(*mut u16, u32, i64, *const ArgRecord) -> u32;

/// Symbol name the native library exports
pub const FORMAT_SYMBOL: &str = "varcall_format";

/// Handle to the loaded native formatting library
pub struct NativeLibrary {
    handle: NonNull<c_void>,
}

impl NativeLibrary {
    /// Load the library by name or path and keep it resident
    pub fn open(name: &str) -> Result<Self, LibraryError> {
        Self::open_impl(name)
    }

    /// Resolve the formatting entry point
    pub fn formatter(&self) -> Result<ExternFormatter<'_>, LibraryError> {
        let addr = self.symbol(FORMAT_SYMBOL)?;
        // Safety: the exported symbol is the cdecl entry point described
        // by FormatFn; the returned wrapper borrows self so the library
        // outlives every call through the pointer.
        let func = unsafe { core::mem::transmute::<*const c_void, FormatFn>(addr) };
        Ok(ExternFormatter { func, _library: self })
    }

    #[cfg(unix)]
    fn open_impl(name: &str) -> Result<Self, LibraryError> {
        use std::ffi::CString;
        use std::os::raw::c_char;

        extern "C" {
            fn dlopen(filename: *const c_char, flag: i32) -> *mut c_void;
            fn dlerror() -> *const c_char;
        }

        const RTLD_NOW: i32 = 2;

        let cname = CString::new(name).map_err(|_| LibraryError::InvalidName)?;

        unsafe {
            let handle = dlopen(cname.as_ptr(), RTLD_NOW);
            NonNull::new(handle)
                .map(|handle| Self { handle })
                .ok_or_else(|| {
                    let err = dlerror();
                    let detail = if err.is_null() {
                        "unknown error".into()
                    } else {
                        std::ffi::CStr::from_ptr(err).to_string_lossy().into_owned()
                    };
                    LibraryError::Open { detail }
                })
        }
    }

    #[cfg(windows)]
    fn open_impl(name: &str) -> Result<Self, LibraryError> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;

        extern "system" {
            fn LoadLibraryW(filename: *const u16) -> *mut c_void;
            fn GetLastError() -> u32;
        }

        let wide: Vec<u16> = OsStr::new(name).encode_wide().chain(Some(0)).collect();

        unsafe {
            let handle = LoadLibraryW(wide.as_ptr());
            NonNull::new(handle)
                .map(|handle| Self { handle })
                .ok_or_else(|| LibraryError::Open {
                    detail: format!("error code {}", GetLastError()),
                })
        }
    }

    #[cfg(unix)]
    fn symbol(&self, name: &str) -> Result<*const c_void, LibraryError> {
        use std::ffi::CString;
        use std::os::raw::c_char;

        extern "C" {
            fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
        }

        let cname = CString::new(name).map_err(|_| LibraryError::InvalidName)?;

        unsafe {
            let addr = dlsym(self.handle.as_ptr(), cname.as_ptr());
            if addr.is_null() {
                Err(LibraryError::Symbol { name: name.into() })
            } else {
                Ok(addr as *const c_void)
            }
        }
    }

    #[cfg(windows)]
    fn symbol(&self, name: &str) -> Result<*const c_void, LibraryError> {
        use std::ffi::CString;

        extern "system" {
            fn GetProcAddress(module: *mut c_void, name: *const u8) -> *mut c_void;
        }

        let cname = CString::new(name).map_err(|_| LibraryError::InvalidName)?;

        unsafe {
            let addr = GetProcAddress(self.handle.as_ptr(), cname.as_ptr() as *const u8);
            if addr.is_null() {
                Err(LibraryError::Symbol { name: name.into() })
            } else {
                Ok(addr as *const c_void)
            }
        }
    }
}

impl Drop for NativeLibrary {
    #[cfg(unix)]
    fn drop(&mut self) {
        extern "C" {
            fn dlclose(handle: *mut c_void) -> i32;
        }
        unsafe {
            dlclose(self.handle.as_ptr());
        }
    }

    #[cfg(windows)]
    fn drop(&mut self) {
        extern "system" {
            fn FreeLibrary(module: *mut c_void) -> i32;
        }
        unsafe {
            FreeLibrary(self.handle.as_ptr());
        }
    }
}

// Safety: the handle is an opaque loader token; calls through resolved
// symbols are synchronized by the callers that hold them.
unsafe impl Send for NativeLibrary {}
unsafe impl Sync for NativeLibrary {}

/// Bridge to the real native entry point
pub struct ExternFormatter<'l> {
    func: FormatFn,
    _library: &'l NativeLibrary,
}

impl NativeFormatter for ExternFormatter<'_> {
    unsafe fn invoke(
        &self,
        out: Option<&mut WideBuffer>,
        argc: i64,
        argv: *const ArgRecord,
    ) -> Result<u32, Error> {
        let (buf, capacity) = match out {
            Some(out) => (out.as_mut_ptr(), out.capacity() as u32),
            None => (core::ptr::null_mut(), 0),
        };
        // Status is surfaced verbatim; the native contract reports the
        // produced UTF-16 length and has no failure statuses today.
        Ok((self.func)(buf, capacity, argc, argv))
    }
}

/// Library loading and binding errors
#[derive(Debug)]
pub enum LibraryError {
    InvalidName,
    Open { detail: String },
    Symbol { name: String },
}

impl core::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "Invalid library name"),
            Self::Open { detail } => write!(f, "Failed to load native library: {}", detail),
            Self::Symbol { name } => write!(f, "Symbol not found: {}", name),
        }
    }
}

impl std::error::Error for LibraryError {}
