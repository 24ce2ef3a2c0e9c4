use criterion::{black_box, criterion_group, criterion_main, Criterion};

use varcall::{EmulatedFormatter, Generation, HeapBuilder, RefValue, StackBuilder, Value};

// The three call shapes the engine is exercised with in production: pure
// value types, value types plus one pinned string, and the full mix. No
// output buffer, so the native side skips formatting and the measurement
// isolates marshaling plus the boundary crossing.
fn bench_builders(c: &mut Criterion) {
    let formatter = EmulatedFormatter::new(Generation::V2);
    let heap = HeapBuilder::new(&formatter);
    let stack = StackBuilder::new(&formatter);

    let payload = [1u8, 2, 3, 4, 5];
    let only_value_types = [
        Value::Long(1),
        Value::Double(3.125),
        Value::ULong(4),
        Value::Reference(RefValue::new(777, 999)),
    ];
    let value_types_and_string = [
        Value::Long(1),
        Value::Text("2"),
        Value::Double(3.125),
        Value::ULong(4),
        Value::Reference(RefValue::new(777, 999)),
    ];
    let all_types = [
        Value::Long(1),
        Value::Text("2"),
        Value::Double(3.125),
        Value::ULong(4),
        Value::Binary(&payload),
        Value::Reference(RefValue::new(777, 999)),
    ];

    let scenarios: [(&str, &[Value<'_>]); 3] = [
        ("only_value_types", &only_value_types),
        ("value_types_and_string", &value_types_and_string),
        ("all_types", &all_types),
    ];

    for (name, values) in scenarios {
        c.bench_function(&format!("heap/{}", name), |b| {
            b.iter(|| heap.call(None, black_box(values)).unwrap())
        });
        c.bench_function(&format!("stack/{}", name), |b| {
            b.iter(|| stack.call(None, black_box(values)).unwrap())
        });
    }
}

criterion_group!(benches, bench_builders);
criterion_main!(benches);
