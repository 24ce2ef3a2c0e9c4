//! Marshaling engine tests
//!
//! Organized by component:
//! - Tags: wire codes and kind metadata
//! - Record: ABI layout invariants
//! - Encoding: per-kind slot rules, both generations
//! - Pins: acquisition/release accounting
//! - Registry: dispatch and the unsupported path

use super::*;

fn encode_one<'a>(value: &Value<'a>, generation: Generation, pins: &mut PinSet<'a>) -> ArgRecord {
    let mut record = ArgRecord::zeroed();
    encode_record(value, generation, &mut record, pins).expect("supported kind");
    record
}

// ===== Tags =====

#[test]
fn tag_codes_match_the_wire() {
    assert_eq!(TypeTag::Text.code(), 0x01);
    assert_eq!(TypeTag::Binary.code(), 0x02);
    assert_eq!(TypeTag::Long.code(), 0x03);
    assert_eq!(TypeTag::ULong.code(), 0x04);
    assert_eq!(TypeTag::Decimal.code(), 0x05);
    assert_eq!(TypeTag::Float.code(), 0x06);
    assert_eq!(TypeTag::Double.code(), 0x07);
    assert_eq!(TypeTag::Reference.code(), 0x08);
}

#[test]
fn tag_round_trips_through_code() {
    for tag in [
        TypeTag::Text,
        TypeTag::Binary,
        TypeTag::Long,
        TypeTag::ULong,
        TypeTag::Decimal,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::Reference,
    ] {
        assert_eq!(TypeTag::from_code(tag.code()), Some(tag));
    }
    assert_eq!(TypeTag::from_code(0), None);
    assert_eq!(TypeTag::from_code(9), None);
    assert_eq!(TypeTag::from_code(-1), None);
}

#[test]
fn only_text_and_binary_carry_payload() {
    assert!(TypeTag::Text.carries_payload());
    assert!(TypeTag::Binary.carries_payload());
    assert!(!TypeTag::Long.carries_payload());
    assert!(!TypeTag::ULong.carries_payload());
    assert!(!TypeTag::Float.carries_payload());
    assert!(!TypeTag::Double.carries_payload());
    assert!(!TypeTag::Reference.carries_payload());
}

// ===== Record layout =====

#[test]
fn record_is_five_eight_byte_words() {
    assert_eq!(core::mem::size_of::<ArgRecord>(), RECORD_SIZE);
    assert_eq!(RECORD_SIZE, 40);
    assert_eq!(RECORD_WORDS, 5);
}

#[test]
fn record_size_is_variant_independent() {
    let payload = [7u8; 3];
    let mut pins = PinSet::new();
    for value in [
        Value::Long(-5),
        Value::ULong(5),
        Value::Float(1.5),
        Value::Double(2.5),
        Value::Text("t"),
        Value::Binary(&payload),
        Value::Reference(RefValue::new(1, 2)),
    ] {
        let record = encode_one(&value, Generation::V2, &mut pins);
        assert_eq!(core::mem::size_of_val(&record), 40);
    }
}

#[test]
fn zeroed_record_has_all_slots_zero() {
    let record = ArgRecord::zeroed();
    assert_eq!(record.tag, 0);
    assert_eq!(record.int_word, 0);
    assert_eq!(record.uint_word, 0);
    assert_eq!(record.float_word, 0.0);
    assert!(record.payload.is_null());
    assert_eq!(record.kind(), None);
}

// ===== Encoding: value-only kinds =====

#[test]
fn long_uses_int_word_only() {
    let mut pins = PinSet::new();
    let record = encode_one(&Value::Long(-42), Generation::V2, &mut pins);
    assert_eq!(record.kind(), Some(TypeTag::Long));
    assert_eq!(record.int_word, -42);
    assert_eq!(record.uint_word, 0);
    assert_eq!(record.float_word, 0.0);
    assert!(record.payload.is_null());
    assert_eq!(pins.acquired(), 0);
}

#[test]
fn ulong_slot_depends_on_generation() {
    let mut pins = PinSet::new();

    // V1: shared integer word, bit-reinterpreted
    let record = encode_one(&Value::ULong(u64::MAX), Generation::V1, &mut pins);
    assert_eq!(record.int_word, -1);
    assert_eq!(record.uint_word, 0);

    // V2: dedicated unsigned word
    let record = encode_one(&Value::ULong(u64::MAX), Generation::V2, &mut pins);
    assert_eq!(record.int_word, 0);
    assert_eq!(record.uint_word, u64::MAX);

    assert_eq!(pins.acquired(), 0);
}

#[test]
fn float_widens_to_double_word() {
    let mut pins = PinSet::new();
    let record = encode_one(&Value::Float(1.0001), Generation::V2, &mut pins);
    assert_eq!(record.kind(), Some(TypeTag::Float));
    assert_eq!(record.float_word, f64::from(1.0001f32));
    assert_eq!(record.float_word as f32, 1.0001f32);
    assert!(record.payload.is_null());
}

#[test]
fn double_is_stored_verbatim() {
    let mut pins = PinSet::new();
    let record = encode_one(&Value::Double(3.125), Generation::V2, &mut pins);
    assert_eq!(record.kind(), Some(TypeTag::Double));
    assert_eq!(record.float_word, 3.125);
    assert_eq!(record.int_word, 0);
}

#[test]
fn reference_fills_both_value_words() {
    for generation in [Generation::V1, Generation::V2] {
        let mut pins = PinSet::new();
        let value = Value::Reference(RefValue::new(777, 999));
        let record = encode_one(&value, generation, &mut pins);
        assert_eq!(record.kind(), Some(TypeTag::Reference));
        assert_eq!(record.int_word, 777);
        assert_eq!(record.uint_word, 999);
        assert!(record.payload.is_null());
        assert_eq!(pins.acquired(), 0);
    }
}

// ===== Encoding: payload kinds =====

#[test]
fn text_pins_nul_terminated_utf16() {
    let mut pins = PinSet::new();
    let record = encode_one(&Value::Text("2"), Generation::V1, &mut pins);

    assert_eq!(record.kind(), Some(TypeTag::Text));
    assert!(!record.payload.is_null());
    // Length omitted: the native side relies on the terminator.
    assert_eq!(record.int_word, 0);
    assert_eq!(record.uint_word, 0);
    assert_eq!(pins.acquired(), 1);

    let units = unsafe { core::slice::from_raw_parts(record.payload as *const u16, 2) };
    assert_eq!(units, &[u16::from(b'2'), 0]);
}

#[test]
fn text_conversion_handles_non_ascii() {
    let wide = to_wide("π∞");
    let expected: Vec<u16> = "π∞".encode_utf16().chain(Some(0)).collect();
    assert_eq!(&*wide, expected.as_slice());
}

#[test]
fn binary_records_length_and_address() {
    let payload = [1u8, 2, 3, 4, 5];
    let mut pins = PinSet::new();
    let record = encode_one(&Value::Binary(&payload), Generation::V1, &mut pins);

    assert_eq!(record.kind(), Some(TypeTag::Binary));
    assert_eq!(record.int_word, 5);
    assert_eq!(record.payload, payload.as_ptr() as *const core::ffi::c_void);
    assert_eq!(pins.acquired(), 1);
}

#[test]
fn empty_binary_is_a_valid_payload() {
    let payload: [u8; 0] = [];
    let mut pins = PinSet::new();
    let record = encode_one(&Value::Binary(&payload), Generation::V2, &mut pins);
    assert_eq!(record.int_word, 0);
    assert!(!record.payload.is_null());
}

#[test]
fn v2_embeds_pin_tokens_in_acquisition_order() {
    let payload = [9u8];
    let mut pins = PinSet::new();

    let text = encode_one(&Value::Text("a"), Generation::V2, &mut pins);
    let binary = encode_one(&Value::Binary(&payload), Generation::V2, &mut pins);

    assert_eq!(text.uint_word, 1);
    assert_eq!(binary.uint_word, 2);
}

#[test]
fn v1_keeps_payload_uint_word_zero() {
    let payload = [9u8];
    let mut pins = PinSet::new();

    let text = encode_one(&Value::Text("a"), Generation::V1, &mut pins);
    let binary = encode_one(&Value::Binary(&payload), Generation::V1, &mut pins);

    assert_eq!(text.uint_word, 0);
    assert_eq!(binary.uint_word, 0);
}

// ===== Pins =====

#[test]
fn pin_set_counts_acquire_and_release() {
    let payload = [1u8, 2];
    let mut pins = PinSet::new();
    let (first, _) = pins.pin_text("hello");
    let (second, _) = pins.pin_bytes(&payload);

    assert_eq!(pins.acquired(), 2);
    assert_eq!(pins.released(), 0);
    assert_eq!(pins.outstanding(), 2);

    assert!(pins.release(first));
    assert!(pins.release(second));
    assert_eq!(pins.outstanding(), 0);
}

#[test]
fn pin_release_is_exactly_once() {
    let mut pins = PinSet::new();
    let (handle, _) = pins.pin_text("x");

    assert!(pins.release(handle));
    assert!(!pins.release(handle));
    assert_eq!(pins.released(), 1);
}

#[test]
fn release_all_sweeps_everything_once() {
    let payload = [0u8; 4];
    let mut pins = PinSet::new();
    pins.pin_text("a");
    pins.pin_bytes(&payload);
    let (taken, _) = pins.pin_text("b");
    pins.release(taken);

    pins.release_all();
    assert_eq!(pins.acquired(), 3);
    assert_eq!(pins.released(), 3);

    // Idempotent: nothing left to sweep.
    pins.release_all();
    assert_eq!(pins.released(), 3);
}

#[test]
fn pinned_text_address_is_stable_across_set_growth() {
    let mut pins = PinSet::new();
    let (_, addr) = pins.pin_text("stable");
    for i in 0..32 {
        pins.pin_text(if i % 2 == 0 { "even" } else { "odd" });
    }
    let units = unsafe { core::slice::from_raw_parts(addr as *const u16, 6) };
    assert_eq!(String::from_utf16_lossy(units), "stable");
}

#[test]
fn pin_tokens_are_nonzero() {
    assert_eq!(PinHandle::from_token(0), None);
    let handle = PinHandle::from_token(3).unwrap();
    assert_eq!(handle.token(), 3);
}

// ===== Registry =====

#[test]
fn every_supported_kind_has_an_encoder() {
    for tag in [
        TypeTag::Text,
        TypeTag::Binary,
        TypeTag::Long,
        TypeTag::ULong,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::Reference,
    ] {
        assert!(encoder_for(tag).is_ok(), "missing encoder for {:?}", tag);
    }
}

#[test]
fn decimal_has_no_encoder() {
    let err = encoder_for(TypeTag::Decimal).err().expect("decimal must fail");
    match err {
        crate::error::Error::UnsupportedType { kind } => assert_eq!(kind, "decimal"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn validate_names_the_offending_kind() {
    let values = [Value::Long(1), Value::Decimal(10), Value::Text("x")];
    let err = validate(&values).err().expect("sequence must fail");
    assert_eq!(err.to_string(), "Type not supported: decimal");
}

#[test]
fn validate_accepts_all_supported_kinds() {
    let payload = [1u8];
    let values = [
        Value::Long(1),
        Value::ULong(2),
        Value::Float(0.5),
        Value::Double(0.25),
        Value::Text("ok"),
        Value::Binary(&payload),
        Value::Reference(RefValue::new(3, 4)),
    ];
    assert!(validate(&values).is_ok());
}
