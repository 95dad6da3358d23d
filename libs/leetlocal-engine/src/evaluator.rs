/// Test Evaluator - Language-Agnostic Comparison Logic
///
/// **Core Responsibility:**
/// Decide whether a candidate's return value matches the expected output, and turn one
/// invocation outcome into a `TestResult`.
///
/// **Critical Properties:**
/// - Knows nothing about JavaScript or Python
/// - Pure functions over `serde_json::Value`
///
/// **Equality Rules (applied in order):**
/// 1. Primitives compare by value; numbers compare numerically (`1 == 1.0`)
/// 2. `null` only equals `null`
/// 3. Arrays: same length, then elementwise. In unordered mode both sides are deep-sorted
///    first, so order is ignored at every nesting depth
/// 4. Objects: same key set, pairwise-equal values
/// 5. Anything else (type mismatch) is unequal
///
/// The Python harness carries an independent copy of these rules; keep the two in step.

use leetlocal_common::types::{TestCase, TestResult};
use serde_json::{Map, Number, Value};

/// Compare `actual` against `expected`.
pub fn equal(a: &Value, b: &Value, unordered: bool) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            if x.len() != y.len() {
                return false;
            }
            if unordered {
                let x = sorted_elements(x);
                let y = sorted_elements(y);
                x.iter().zip(y.iter()).all(|(l, r)| equal(l, r, true))
            } else {
                x.iter().zip(y.iter()).all(|(l, r)| equal(l, r, false))
            }
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, l)| match y.get(key) {
                    Some(r) => equal(l, r, unordered),
                    None => false,
                })
        }
        _ => false,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn sorted_elements(items: &[Value]) -> Vec<Value> {
    let mut keyed: Vec<(String, Value)> = items
        .iter()
        .map(|item| {
            let sorted = deep_sort(item);
            (canonical_key(&sorted), sorted)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, v)| v).collect()
}

/// Recursively order every array inside `value` by the canonical form of its elements.
pub fn deep_sort(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(sorted_elements(items)),
        Value::Object(map) => {
            let sorted: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), deep_sort(v)))
                .collect();
            Value::Object(sorted)
        }
        other => other.clone(),
    }
}

/// Compact, key-sorted serialisation used as the sort key in unordered mode. Integral floats
/// are written as integers so `1.0` and `1` sort together.
pub fn canonical_key(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&canonical_number(n)),
        Value::String(s) => out.push_str(&Value::String(s.clone()).to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
    }
}

fn canonical_number(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}

/// Raw outcome of invoking a candidate once.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Returned(Value),
    Raised(String),
}

/// Evaluate a single invocation against its test case.
///
/// A raised error always fails and carries a non-empty message; a returned value passes
/// when it is `equal` to the expected output.
pub fn evaluate_test(
    test_index: usize,
    test_case: &TestCase,
    invocation: Invocation,
    unordered: bool,
) -> TestResult {
    match invocation {
        Invocation::Returned(actual) => TestResult {
            passed: equal(&actual, &test_case.output, unordered),
            test_index,
            input: test_case.input.clone(),
            expected: test_case.output.clone(),
            actual: Some(actual),
            error: None,
        },
        Invocation::Raised(message) => {
            let message = if message.trim().is_empty() {
                "candidate raised an error without a message".to_string()
            } else {
                message
            };
            TestResult {
                passed: false,
                test_index,
                input: test_case.input.clone(),
                expected: test_case.output.clone(),
                actual: None,
                error: Some(message),
            }
        }
    }
}

/// Count of passing results.
pub fn passed_count(results: &[TestResult]) -> usize {
    results.iter().filter(|r| r.passed).count()
}

/// True when there is at least one result and every result passed.
pub fn all_passed(results: &[TestResult]) -> bool {
    !results.is_empty() && results.iter().all(|r| r.passed)
}
