//! Error taxonomy for the marshaling engine
//!
//! Every error surfaces to the immediate caller; nothing is swallowed and
//! nothing retries.

use crate::bridge::LibraryError;

/// Marshaling and bridge errors
#[derive(Debug)]
pub enum Error {
    /// A value's kind has no registered encoder. Raised before any pin is
    /// taken and before any native invocation.
    UnsupportedType { kind: &'static str },
    /// The bridge reported a failure status; surfaced as-is.
    NativeCall { status: u32 },
    /// The native formatting library could not be loaded or bound.
    Library(LibraryError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedType { kind } => write!(f, "Type not supported: {}", kind),
            Self::NativeCall { status } => {
                write!(f, "Native formatter failed with status {}", status)
            }
            Self::Library(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Library(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LibraryError> for Error {
    #[inline]
    fn from(err: LibraryError) -> Self {
        Self::Library(err)
    }
}
