//! Type-tag dispatch - one encoder per supported kind
//!
//! The supported set is closed at compile time: extending it means a new
//! `Value` variant and a new arm here, not runtime registration. Lookup is
//! a side-effect-free match; the decimal tag is declared in the ABI but
//! deliberately has no encoder.

use super::pin::{PinHandle, PinSet};
use super::record::ArgRecord;
use super::types::{Generation, TypeTag, Value};
use crate::error::Error;

/// Encoder for one kind: fills a zeroed record, pinning payload if any
pub type Encoder =
    for<'a> fn(&Value<'a>, Generation, &mut ArgRecord, &mut PinSet<'a>) -> Option<PinHandle>;

/// Look up the encoder responsible for a kind
///
/// O(1) and side-effect-free. The decimal tag fails here: it is carried
/// by an external codec and has never had an encoder in either layout
/// generation.
pub fn encoder_for(tag: TypeTag) -> Result<Encoder, Error> {
    match tag {
        TypeTag::Text => Ok(encode_text),
        TypeTag::Binary => Ok(encode_binary),
        TypeTag::Long => Ok(encode_long),
        TypeTag::ULong => Ok(encode_ulong),
        TypeTag::Float => Ok(encode_float),
        TypeTag::Double => Ok(encode_double),
        TypeTag::Reference => Ok(encode_reference),
        TypeTag::Decimal => Err(Error::UnsupportedType { kind: tag.name() }),
    }
}

/// Check every value against the registry before any pin is taken
///
/// Builders call this first so an unsupported kind fails the whole call
/// with no partial pinning and no native invocation.
pub fn validate(values: &[Value<'_>]) -> Result<(), Error> {
    for value in values {
        if let Err(err) = encoder_for(value.tag()) {
            super::note_unsupported();
            crate::logging::log_unsupported_type(value.kind_name());
            return Err(err);
        }
    }
    Ok(())
}

/// Encode one value into one record
pub fn encode_record<'a>(
    value: &Value<'a>,
    generation: Generation,
    record: &mut ArgRecord,
    pins: &mut PinSet<'a>,
) -> Result<Option<PinHandle>, Error> {
    let encoder = encoder_for(value.tag())?;
    Ok(encoder(value, generation, record, pins))
}

/// Embed a pin token in the otherwise-unused unsigned word (V2 layouts)
#[inline]
fn stamp_token(generation: Generation, record: &mut ArgRecord, handle: PinHandle) {
    if generation.embeds_pin_token() {
        record.uint_word = handle.token() as u64;
    }
}

fn encode_text<'a>(
    value: &Value<'a>,
    generation: Generation,
    record: &mut ArgRecord,
    pins: &mut PinSet<'a>,
) -> Option<PinHandle> {
    let Value::Text(text) = *value else {
        debug_assert!(false, "dispatch gave text encoder a {}", value.kind_name());
        return None;
    };
    let (handle, addr) = pins.pin_text(text);
    record.tag = TypeTag::Text.code();
    record.payload = addr;
    // Length omitted: the native side reads to the NUL terminator.
    stamp_token(generation, record, handle);
    Some(handle)
}

fn encode_binary<'a>(
    value: &Value<'a>,
    generation: Generation,
    record: &mut ArgRecord,
    pins: &mut PinSet<'a>,
) -> Option<PinHandle> {
    let Value::Binary(bytes) = *value else {
        debug_assert!(false, "dispatch gave binary encoder a {}", value.kind_name());
        return None;
    };
    let (handle, addr) = pins.pin_bytes(bytes);
    record.tag = TypeTag::Binary.code();
    record.int_word = bytes.len() as i64;
    record.payload = addr;
    stamp_token(generation, record, handle);
    Some(handle)
}

fn encode_long<'a>(
    value: &Value<'a>,
    _generation: Generation,
    record: &mut ArgRecord,
    _pins: &mut PinSet<'a>,
) -> Option<PinHandle> {
    let Value::Long(v) = *value else {
        debug_assert!(false, "dispatch gave long encoder a {}", value.kind_name());
        return None;
    };
    record.tag = TypeTag::Long.code();
    record.int_word = v;
    None
}

fn encode_ulong<'a>(
    value: &Value<'a>,
    generation: Generation,
    record: &mut ArgRecord,
    _pins: &mut PinSet<'a>,
) -> Option<PinHandle> {
    let Value::ULong(v) = *value else {
        debug_assert!(false, "dispatch gave ulong encoder a {}", value.kind_name());
        return None;
    };
    record.tag = TypeTag::ULong.code();
    if generation.shares_int_word() {
        // Stored bit-reinterpreted as signed; the native side reads the
        // same word back as unsigned.
        record.int_word = v as i64;
    } else {
        record.uint_word = v;
    }
    None
}

fn encode_float<'a>(
    value: &Value<'a>,
    _generation: Generation,
    record: &mut ArgRecord,
    _pins: &mut PinSet<'a>,
) -> Option<PinHandle> {
    let Value::Float(v) = *value else {
        debug_assert!(false, "dispatch gave float encoder a {}", value.kind_name());
        return None;
    };
    record.tag = TypeTag::Float.code();
    record.float_word = f64::from(v);
    None
}

fn encode_double<'a>(
    value: &Value<'a>,
    _generation: Generation,
    record: &mut ArgRecord,
    _pins: &mut PinSet<'a>,
) -> Option<PinHandle> {
    let Value::Double(v) = *value else {
        debug_assert!(false, "dispatch gave double encoder a {}", value.kind_name());
        return None;
    };
    record.tag = TypeTag::Double.code();
    record.float_word = v;
    None
}

fn encode_reference<'a>(
    value: &Value<'a>,
    _generation: Generation,
    record: &mut ArgRecord,
    _pins: &mut PinSet<'a>,
) -> Option<PinHandle> {
    let Value::Reference(r) = *value else {
        debug_assert!(false, "dispatch gave reference encoder a {}", value.kind_name());
        return None;
    };
    record.tag = TypeTag::Reference.code();
    record.int_word = r.id as i64;
    record.uint_word = r.refnum;
    None
}
