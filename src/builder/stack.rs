//! Stack-arena builder - the allocation-free encoding path
//!
//! Identical external behavior to the heap path, but the record storage is
//! a fixed-stride inline arena in the call frame: no heap allocation for
//! the record array and no whole-buffer pin, which is this builder's
//! entire reason to exist. Records are filled by index, never by walking
//! raw pointers. Payload pins are walked back after the call - via the
//! tokens the V2 layout embeds in the filled buffer, or in acquisition
//! order under V1.

use smallvec::SmallVec;

use crate::bridge::{NativeFormatter, WideBuffer};
use crate::error::Error;
use crate::marshal::{self, ArgRecord, Generation, PinHandle, PinSet, Value};

use super::CallReport;

/// Records kept inline before the arena spills; covers typical call sites
pub const INLINE_RECORDS: usize = 16;

/// Fixed-stride record arena with inline storage
pub type RecordArena = SmallVec<[ArgRecord; INLINE_RECORDS]>;

/// Builder backed by function-scope record storage
pub struct StackBuilder<'f> {
    formatter: &'f dyn NativeFormatter,
    generation: Generation,
}

impl<'f> StackBuilder<'f> {
    pub fn new(formatter: &'f dyn NativeFormatter) -> Self {
        Self::with_generation(formatter, Generation::default())
    }

    pub fn with_generation(formatter: &'f dyn NativeFormatter, generation: Generation) -> Self {
        Self {
            formatter,
            generation,
        }
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Encode values into the inline arena plus the payload pin set
    ///
    /// Bit-identical records to the heap path for the same input; only
    /// the storage differs. No buffer pin is taken - the arena lives in
    /// the caller's frame and cannot relocate during the call.
    pub fn encode<'a>(&self, values: &'a [Value<'a>]) -> Result<(RecordArena, PinSet<'a>), Error> {
        marshal::validate(values)?;

        let mut pins = PinSet::new();
        let mut arena = RecordArena::new();
        for value in values {
            let mut record = ArgRecord::zeroed();
            marshal::encode_record(value, self.generation, &mut record, &mut pins)?;
            arena.push(record);
        }
        Ok((arena, pins))
    }

    /// Encode, invoke the bridge once, walk the pins back and release them
    pub fn call(
        &self,
        out: Option<&mut WideBuffer>,
        values: &[Value<'_>],
    ) -> Result<CallReport, Error> {
        let (arena, mut pins) = self.encode(values)?;

        tracing::debug!(
            records = arena.len(),
            pins = pins.acquired(),
            generation = ?self.generation,
            "invoking native formatter (stack path)"
        );

        // Safety: the arena is fully populated and stays in this frame;
        // payloads are held resident by `pins` until the call returns.
        let invoked = unsafe { self.formatter.invoke(out, arena.len() as i64, arena.as_ptr()) };
        marshal::note_native_call();

        let status = match invoked {
            Ok(status) => status,
            // PinSet's drop releases everything taken so far.
            Err(err) => return Err(err),
        };

        if self.generation.embeds_pin_token() {
            release_embedded(&arena, &mut pins);
        } else {
            pins.release_all();
        }
        debug_assert_eq!(pins.outstanding(), 0, "pin walk-back missed a payload");

        marshal::note_records(arena.len());
        crate::logging::log_native_call(arena.len(), status);

        Ok(CallReport {
            status,
            records: arena.len(),
            pins_acquired: pins.acquired(),
            pins_released: pins.released(),
        })
    }
}

/// Release pins by re-reading the tokens embedded in the filled buffer
///
/// Walks records in encoding order; each payload record owns exactly one
/// pin, so every pin is released exactly once.
fn release_embedded(arena: &RecordArena, pins: &mut PinSet<'_>) {
    for record in arena.iter() {
        if !record.carries_payload() {
            continue;
        }
        if let Some(handle) = PinHandle::from_token(record.uint_word as u32) {
            let freed = pins.release(handle);
            debug_assert!(freed, "embedded token released twice");
        }
    }
}
