//! Heap-array builder - the safety-first encoding path
//!
//! Allocates one record per value in a heap array, pins every payload and
//! the record array itself, invokes the bridge, then releases everything
//! wholesale. The reference strategy the stack path must match bit for bit.

use core::ffi::c_void;

use crate::bridge::{NativeFormatter, WideBuffer};
use crate::error::Error;
use crate::marshal::{self, ArgRecord, Generation, PinSet, Value};

use super::CallReport;

/// Builder backed by a heap record array
pub struct HeapBuilder<'f> {
    formatter: &'f dyn NativeFormatter,
    generation: Generation,
}

impl<'f> HeapBuilder<'f> {
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

    /// Encode values into a populated record buffer plus its pin set
    ///
    /// Fails fast on an unsupported kind: the sequence is validated
    /// against the registry before any record is filled or pin taken.
    /// Payload pins are joined by one pin on the record buffer itself so
    /// its address stays stable while the native call holds it.
    pub fn encode<'a>(
        &self,
        values: &'a [Value<'a>],
    ) -> Result<(Vec<ArgRecord>, PinSet<'a>), Error> {
        marshal::validate(values)?;

        let mut pins = PinSet::new();
        let mut records = vec![ArgRecord::zeroed(); values.len()];
        for (record, value) in records.iter_mut().zip(values) {
            marshal::encode_record(value, self.generation, record, &mut pins)?;
        }
        if !records.is_empty() {
            pins.pin_buffer(records.as_ptr() as *const c_void);
        }
        Ok((records, pins))
    }

    /// Encode, invoke the bridge once, release every pin
    pub fn call(
        &self,
        out: Option<&mut WideBuffer>,
        values: &[Value<'_>],
    ) -> Result<CallReport, Error> {
        let (records, mut pins) = self.encode(values)?;

        tracing::debug!(
            records = records.len(),
            pins = pins.acquired(),
            generation = ?self.generation,
            "invoking native formatter (heap path)"
        );

        // Safety: `records` is fully populated and both it and every
        // payload are held resident by `pins` until the call returns.
        let invoked = unsafe { self.formatter.invoke(out, records.len() as i64, records.as_ptr()) };
        marshal::note_native_call();

        let status = match invoked {
            Ok(status) => status,
            // PinSet's drop releases everything taken so far.
            Err(err) => return Err(err),
        };

        pins.release_all();
        marshal::note_records(records.len());
        crate::logging::log_native_call(records.len(), status);

        Ok(CallReport {
            status,
            records: records.len(),
            pins_acquired: pins.acquired(),
            pins_released: pins.released(),
        })
    }
}
