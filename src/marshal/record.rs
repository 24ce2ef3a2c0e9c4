//! Wire record - the fixed-size argument descriptor
//!
//! Five consecutive 8-byte words per argument, 40 bytes total. The exact
//! size and field order is an ABI contract with the native formatter.

use core::ffi::c_void;

use super::types::TypeTag;

/// Words per record
pub const RECORD_WORDS: usize = 5;

/// Record stride in bytes
pub const RECORD_SIZE: usize = RECORD_WORDS * 8;

/// One argument record in the native buffer layout
///
/// Exactly one interpretation of the non-tag words is meaningful per tag;
/// unused words stay zero (the V2 layout deliberately repurposes the
/// unsigned word of payload records for pin-handle bookkeeping).
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct ArgRecord {
    /// Wire code from `TypeTag`
    pub tag: i64,
    /// Signed value, binary payload byte length, or reference id
    pub int_word: i64,
    /// Unsigned value, reference number, or embedded pin token (V2)
    pub uint_word: u64,
    /// Float (widened to f64) or double value
    pub float_word: f64,
    /// Pinned payload address, null for value-only kinds
    pub payload: *const c_void,
}

impl ArgRecord {
    /// All-zero record, the state every slot starts from
    #[inline]
    pub const fn zeroed() -> Self {
        Self {
            tag: 0,
            int_word: 0,
            uint_word: 0,
            float_word: 0.0,
            payload: core::ptr::null(),
        }
    }

    /// Decode the tag word, if it names a known kind
    #[inline]
    pub fn kind(&self) -> Option<TypeTag> {
        TypeTag::from_code(self.tag)
    }

    /// Whether this record points at pinned payload memory
    #[inline]
    pub fn carries_payload(&self) -> bool {
        matches!(self.kind(), Some(tag) if tag.carries_payload())
    }
}

impl Default for ArgRecord {
    #[inline]
    fn default() -> Self {
        Self::zeroed()
    }
}

// The 40-byte stride is dictated by the native reader.
const _: () = assert!(core::mem::size_of::<ArgRecord>() == RECORD_SIZE);
const _: () = assert!(core::mem::align_of::<ArgRecord>() == 8);
