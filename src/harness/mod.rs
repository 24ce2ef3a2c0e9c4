//! Correctness harness - both builders against one expected rendering
//!
//! Runs the heap and stack builders over the same values and formatter and
//! compares the output text. Benchmarking lives in `benches/marshal.rs`.

use crate::bridge::{NativeFormatter, WideBuffer};
use crate::builder::{HeapBuilder, StackBuilder};
use crate::error::Error;
use crate::marshal::{Generation, Value};

/// One builder path disagreeing with the expected text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Which path produced it: "heap" or "stack"
    pub path: &'static str,
    pub expected: String,
    pub actual: String,
}

/// Format the same values through both builders
pub fn format_with_both(
    formatter: &dyn NativeFormatter,
    generation: Generation,
    values: &[Value<'_>],
) -> Result<(String, String), Error> {
    let heap = HeapBuilder::with_generation(formatter, generation);
    let stack = StackBuilder::with_generation(formatter, generation);

    let mut out = WideBuffer::default();
    heap.call(Some(&mut out), values)?;
    let heap_text = out.text();

    let mut out = WideBuffer::default();
    stack.call(Some(&mut out), values)?;
    let stack_text = out.text();

    Ok((heap_text, stack_text))
}

/// Verify both builders render `values` as `expected`
///
/// Returns every disagreement; an empty vec means the scenario passed.
pub fn verify(
    formatter: &dyn NativeFormatter,
    generation: Generation,
    expected: &str,
    values: &[Value<'_>],
) -> Result<Vec<Mismatch>, Error> {
    let (heap_text, stack_text) = format_with_both(formatter, generation, values)?;

    let mut mismatches = Vec::new();
    for (path, actual) in [("heap", heap_text), ("stack", stack_text)] {
        if actual != expected {
            tracing::error!(path, expected, actual = actual.as_str(), "output mismatch");
            mismatches.push(Mismatch {
                path,
                expected: expected.to_string(),
                actual,
            });
        }
    }
    Ok(mismatches)
}
