//! Marshaling engine - typed values to native argument records
//!
//! Architecture:
//! - `types.rs` - argument kinds, tags, layout generations
//! - `record.rs` - the five-word wire record (40-byte ABI stride)
//! - `pin.rs` - scoped payload pinning with guaranteed release
//! - `registry.rs` - closed type-tag dispatch to per-kind encoders

mod pin;
mod record;
mod registry;
mod types;

#[cfg(test)]
mod tests;

pub use pin::{to_wide, PinHandle, PinSet};
pub use record::{ArgRecord, RECORD_SIZE, RECORD_WORDS};
pub use registry::{encode_record, encoder_for, validate, Encoder};
pub use types::{Generation, RefValue, TypeTag, Value};

use core::sync::atomic::{AtomicU64, Ordering};

static RECORDS_ENCODED: AtomicU64 = AtomicU64::new(0);
static PINS_ACQUIRED: AtomicU64 = AtomicU64::new(0);
static PINS_RELEASED: AtomicU64 = AtomicU64::new(0);
static NATIVE_CALLS: AtomicU64 = AtomicU64::new(0);
static UNSUPPORTED_ERRORS: AtomicU64 = AtomicU64::new(0);

#[inline]
pub(crate) fn note_records(count: usize) {
    RECORDS_ENCODED.fetch_add(count as u64, Ordering::Relaxed);
}

#[inline]
pub(crate) fn note_pin_acquired() {
    PINS_ACQUIRED.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn note_pin_released(count: usize) {
    PINS_RELEASED.fetch_add(count as u64, Ordering::Relaxed);
}

#[inline]
pub(crate) fn note_native_call() {
    NATIVE_CALLS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn note_unsupported() {
    UNSUPPORTED_ERRORS.fetch_add(1, Ordering::Relaxed);
}

/// Marshaling statistics for monitoring
#[derive(Debug, Clone, Copy)]
pub struct MarshalStats {
    pub records_encoded: u64,
    pub pins_acquired: u64,
    pub pins_released: u64,
    pub native_calls: u64,
    pub unsupported_errors: u64,
}

/// Snapshot the process-wide marshaling counters
pub fn stats() -> MarshalStats {
    MarshalStats {
        records_encoded: RECORDS_ENCODED.load(Ordering::Relaxed),
        pins_acquired: PINS_ACQUIRED.load(Ordering::Relaxed),
        pins_released: PINS_RELEASED.load(Ordering::Relaxed),
        native_calls: NATIVE_CALLS.load(Ordering::Relaxed),
        unsupported_errors: UNSUPPORTED_ERRORS.load(Ordering::Relaxed),
    }
}
