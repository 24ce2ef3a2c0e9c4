//! Bridge - the single call-site contract to the native formatter
//!
//! Architecture:
//! - `output.rs` - capacity-bounded UTF-16 output buffer
//! - `emulated.rs` - in-process emulation of the native reader
//! - `library.rs` - dynamic loading of the real native entry point

mod emulated;
mod library;
mod output;


pub use emulated::EmulatedFormatter;
pub use library::{ExternFormatter, FormatFn, LibraryError, NativeLibrary, FORMAT_SYMBOL};
pub use output::{WideBuffer, DEFAULT_CAPACITY};

use crate::error::Error;
use crate::marshal::ArgRecord;

/// The native formatting entry point, seen through one narrow contract
///
/// Implementations cross the boundary and nothing else: no buffer
/// interpretation, no retry, no status decoding beyond classifying their
/// own failures. The status of a successful call is surfaced verbatim.
pub trait NativeFormatter {
    /// Invoke the formatter over `argc` records starting at `argv`.
    ///
    /// `out` of `None` (or zero capacity) asks the native side to skip
    /// formatting output; the returned status is the produced UTF-16
    /// length, 0 when no buffer was supplied. Output beyond capacity is
    /// truncated by the native side, not here.
    ///
    /// # Safety
    /// Caller must ensure:
    /// - `argv` points to `argc` contiguous, fully-populated records
    /// - every payload pointer in those records stays valid and unmoved
    ///   until this call returns
    unsafe fn invoke(
        &self,
        out: Option<&mut WideBuffer>,
        argc: i64,
        argv: *const ArgRecord,
    ) -> Result<u32, Error>;
}
