//! varcall - argument marshaling for a native variadic text formatter
//!
//! Turns a heterogeneous list of typed values into one contiguous buffer
//! of fixed 40-byte records matching the native ABI, pins payload memory
//! for the duration of a single cdecl call, and releases every pin on
//! every exit path. Two builder strategies (heap array and stack arena)
//! produce identical output; the stack path exists to be measurably
//! cheaper.

pub mod bridge;
pub mod builder;
pub mod error;
pub mod harness;
pub mod logging;
pub mod marshal;

// Re-export the working surface
pub use bridge::{EmulatedFormatter, NativeFormatter, WideBuffer};
pub use builder::{CallReport, HeapBuilder, StackBuilder};
pub use error::Error;
pub use marshal::{Generation, RefValue, TypeTag, Value};

/// Initialize the engine's ambient state (logging)
pub fn init() {
    logging::init();
}
