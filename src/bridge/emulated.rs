//! In-process emulation of the native formatter
//!
//! Reads the record buffer exactly the way the native reader does (raw
//! pointers, tag-switched word interpretation) and renders the same text.
//! Backs the correctness harness and benches when no native library is
//! loaded. Generation-aware: a V1 reader takes unsigned values from the
//! shared integer word.

use core::slice;
use std::fmt::Write as _;

use super::output::WideBuffer;
use super::NativeFormatter;
use crate::error::Error;
use crate::marshal::{ArgRecord, Generation, TypeTag};

/// Native-reader emulation for one layout generation
pub struct EmulatedFormatter {
    generation: Generation,
}

impl EmulatedFormatter {
    #[inline]
    pub fn new(generation: Generation) -> Self {
        Self { generation }
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl NativeFormatter for EmulatedFormatter {
    unsafe fn invoke(
        &self,
        out: Option<&mut WideBuffer>,
        argc: i64,
        argv: *const ArgRecord,
    ) -> Result<u32, Error> {
        let out = match out {
            Some(out) if out.capacity() >= 1 => out,
            // No usable buffer: the native side skips formatting entirely.
            _ => return Ok(0),
        };

        // Safety: per the trait contract, argv points to argc populated
        // records that stay valid for the duration of this call.
        let records = if argc > 0 {
            slice::from_raw_parts(argv, argc as usize)
        } else {
            &[]
        };

        let mut text = String::new();
        for record in records {
            render(record, self.generation, &mut text);
        }

        let wide: Vec<u16> = text.encode_utf16().collect();
        out.clear();
        if wide.len() < out.capacity() {
            out.units_mut()[..wide.len()].copy_from_slice(&wide);
        }
        Ok(wide.len() as u32)
    }
}

/// Render one record the way the native switch does, with trailing "] "
fn render(record: &ArgRecord, generation: Generation, text: &mut String) {
    match record.kind() {
        Some(TypeTag::Long) => {
            let _ = write!(text, "[LONG={}", record.int_word);
        }
        Some(TypeTag::ULong) => {
            let value = if generation.shares_int_word() {
                record.int_word as u64
            } else {
                record.uint_word
            };
            let _ = write!(text, "[ULONG={}", value);
        }
        Some(TypeTag::Float) => {
            let _ = write!(text, "[FLOAT={}", record.float_word as f32);
        }
        Some(TypeTag::Double) => {
            let _ = write!(text, "[DOUBLE={}", record.float_word);
        }
        Some(TypeTag::Text) => {
            let _ = write!(text, "[STRING='{}'", read_wide(record));
        }
        Some(TypeTag::Binary) => {
            text.push_str("[BINARY:");
            for byte in read_bytes(record) {
                let _ = write!(text, " {}", byte);
            }
        }
        Some(TypeTag::Reference) => {
            let _ = write!(text, "[REFERENCE:{}@{}", record.int_word, record.uint_word);
        }
        // Decimal has no rendering case in the native reader either.
        Some(TypeTag::Decimal) | None => {
            let _ = write!(text, "[Unknown TypeCode:{}", record.tag);
        }
    }
    text.push_str("] ");
}

/// Read a NUL-terminated UTF-16 payload
fn read_wide(record: &ArgRecord) -> String {
    let mut units = Vec::new();
    let mut ptr = record.payload as *const u16;
    // Safety: text records point at a pinned NUL-terminated UTF-16 buffer.
    unsafe {
        while *ptr != 0 {
            units.push(*ptr);
            ptr = ptr.add(1);
        }
    }
    String::from_utf16_lossy(&units)
}

/// Read a length-prefixed byte payload
fn read_bytes(record: &ArgRecord) -> &[u8] {
    let len = record.int_word.max(0) as usize;
    // Safety: binary records carry the pinned payload address and its
    // byte length in the integer word.
    unsafe { slice::from_raw_parts(record.payload as *const u8, len) }
}
