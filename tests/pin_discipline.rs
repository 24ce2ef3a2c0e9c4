//! Pin discipline against the process-wide marshaling counters
//!
//! One test on purpose: it reads global counter deltas, so it must not
//! share its binary with anything else that pins.

use varcall::marshal::{self, ArgRecord, PinSet};
use varcall::{EmulatedFormatter, Generation, HeapBuilder, RefValue, StackBuilder, Value};

#[test]
fn pins_balance_on_every_path() {
    let payload = [1u8, 2, 3, 4, 5];
    let values = [
        Value::Long(1),
        Value::Text("2"),
        Value::Binary(&payload),
        Value::Reference(RefValue::new(777, 999)),
    ];

    // Normal calls: everything acquired is released by the time the call
    // returns, for both builders and both generations.
    for generation in [Generation::V1, Generation::V2] {
        let formatter = EmulatedFormatter::new(generation);
        let before = marshal::stats();
        HeapBuilder::with_generation(&formatter, generation)
            .call(None, &values)
            .expect("heap call");
        StackBuilder::with_generation(&formatter, generation)
            .call(None, &values)
            .expect("stack call");
        let after = marshal::stats();

        assert_eq!(
            after.pins_acquired - before.pins_acquired,
            after.pins_released - before.pins_released,
        );
        assert_eq!(after.native_calls - before.native_calls, 2);
    }

    // Unsupported kind: validation rejects the whole sequence before any
    // pin is taken and before any boundary crossing.
    let formatter = EmulatedFormatter::new(Generation::V2);
    let rejected = [Value::Text("pinned first?"), Value::Decimal(1)];
    let before = marshal::stats();
    assert!(HeapBuilder::new(&formatter).call(None, &rejected).is_err());
    let after = marshal::stats();

    assert_eq!(after.pins_acquired, before.pins_acquired);
    assert_eq!(after.pins_released, before.pins_released);
    assert_eq!(after.native_calls, before.native_calls);
    assert_eq!(after.unsupported_errors, before.unsupported_errors + 1);

    // Drop backstop: a pin set abandoned mid-encode still releases
    // everything it took.
    let before = marshal::stats();
    {
        let mut pins = PinSet::new();
        let mut record = ArgRecord::zeroed();
        marshal::encode_record(&Value::Text("abandoned"), Generation::V2, &mut record, &mut pins)
            .expect("encode");
        marshal::encode_record(&Value::Binary(&payload), Generation::V2, &mut record, &mut pins)
            .expect("encode");
        assert_eq!(pins.outstanding(), 2);
        // No release_all: the set goes out of scope holding both pins.
    }
    let after = marshal::stats();
    assert_eq!(after.pins_acquired, before.pins_acquired + 2);
    assert_eq!(after.pins_released, before.pins_released + 2);
}
