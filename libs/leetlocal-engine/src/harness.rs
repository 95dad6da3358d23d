/// Python Harness Generation
///
/// Builds the source of a self-contained Python script that imports a candidate function,
/// runs every test case against it and prints one JSON line with the results.
///
/// The script is a protocol contract with the host:
/// - no stdin
/// - stdout: exactly one line, a JSON array of TestResult objects (camelCase keys)
/// - stderr: candidate prints (import time included) and diagnostics
/// - exit 0 when the batch ran; non-zero when the solution could not be imported
///
/// Everything embedded into the script (paths, function name, tests) is passed through a
/// JSON string literal, which is also a valid Python string literal, so no user data is
/// ever spliced into code unescaped.

use leetlocal_common::types::TestCase;
use std::path::Path;

pub const HARNESS_PROTOCOL_VERSION: u32 = 1;

/// Exit code the harness uses when the solution module cannot provide the function.
pub const LOAD_FAILURE_EXIT_CODE: i32 = 3;

/// Python identifiers (ASCII subset) are the only names the harness will look up.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn py_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Generate the harness script for one run.
pub fn generate(
    solution_path: &Path,
    function_name: &str,
    tests: &[TestCase],
    unordered: bool,
) -> Result<String, serde_json::Error> {
    let tests_json = serde_json::to_string(tests)?;

    Ok(format!(
        r#"# leetlocal python harness v{version}
import copy
import importlib.util
import json
import sys

SOLUTION_PATH = {path}
FUNCTION_NAME = {name}
UNORDERED = {unordered}
TESTS = json.loads({tests})


def _fail_load(message):
    sys.stderr.write(message + "\n")
    sys.exit({load_exit})


def _load_candidate():
    spec = importlib.util.spec_from_file_location("solution", SOLUTION_PATH)
    if spec is None or spec.loader is None:
        _fail_load("cannot import solution from " + SOLUTION_PATH)
    module = importlib.util.module_from_spec(spec)
    sys.modules["solution"] = module
    try:
        spec.loader.exec_module(module)
    except Exception as e:
        _fail_load("failed to load solution: {{}}: {{}}".format(type(e).__name__, e))
    candidate = getattr(module, FUNCTION_NAME, None)
    if not callable(candidate):
        _fail_load("solution does not define a callable named " + FUNCTION_NAME)
    return candidate


def _to_json(value):
    if isinstance(value, (list, tuple)):
        return [_to_json(v) for v in value]
    if isinstance(value, (set, frozenset)):
        return sorted((_to_json(v) for v in value), key=_canonical)
    if isinstance(value, dict):
        return {{str(k): _to_json(v) for k, v in value.items()}}
    if value is None or isinstance(value, (bool, int, float, str)):
        return value
    return repr(value)


def _canonical(value):
    if value is None or isinstance(value, bool) or isinstance(value, str):
        return json.dumps(value, ensure_ascii=False)
    if isinstance(value, (int, float)):
        if isinstance(value, float) and value.is_integer() and abs(value) < 2 ** 53:
            value = int(value)
        return json.dumps(value)
    if isinstance(value, list):
        return "[" + ",".join(_canonical(v) for v in value) + "]"
    if isinstance(value, dict):
        parts = []
        for k in sorted(value):
            parts.append(json.dumps(k, ensure_ascii=False) + ":" + _canonical(value[k]))
        return "{{" + ",".join(parts) + "}}"
    return json.dumps(repr(value), ensure_ascii=False)


def _deep_sort(value):
    if isinstance(value, list):
        items = [_deep_sort(v) for v in value]
        return sorted(items, key=_canonical)
    if isinstance(value, dict):
        return {{k: _deep_sort(v) for k, v in value.items()}}
    return value


def _equal(a, b, unordered):
    if a is None and b is None:
        return True
    if a is None or b is None:
        return False
    if isinstance(a, bool) or isinstance(b, bool):
        return isinstance(a, bool) and isinstance(b, bool) and a == b
    if isinstance(a, (int, float)) and isinstance(b, (int, float)):
        return a == b
    if isinstance(a, str) and isinstance(b, str):
        return a == b
    if isinstance(a, list) and isinstance(b, list):
        if len(a) != len(b):
            return False
        if unordered:
            a = _deep_sort(a)
            b = _deep_sort(b)
        return all(_equal(x, y, unordered) for x, y in zip(a, b))
    if isinstance(a, dict) and isinstance(b, dict):
        if set(a.keys()) != set(b.keys()):
            return False
        return all(_equal(a[k], b[k], unordered) for k in a)
    return False


def _run_test(candidate, index, test):
    args = copy.deepcopy(test["input"])
    expected = test["output"]
    try:
        actual = _to_json(candidate(*args))
        # Infinity and NaN have no JSON form.
        json.dumps(actual, allow_nan=False)
    except Exception as e:
        return {{
            "passed": False,
            "testIndex": index,
            "input": test["input"],
            "expected": expected,
            "actual": None,
            "error": "{{}}: {{}}".format(type(e).__name__, e),
        }}
    return {{
        "passed": _equal(actual, expected, UNORDERED),
        "testIndex": index,
        "input": test["input"],
        "expected": expected,
        "actual": actual,
    }}


def main():
    real_stdout = sys.stdout
    sys.stdout = sys.stderr
    try:
        candidate = _load_candidate()
        results = [_run_test(candidate, i, t) for i, t in enumerate(TESTS)]
    finally:
        sys.stdout = real_stdout
    sys.stdout.write(json.dumps(results) + "\n")
    sys.stdout.flush()


main()
"#,
        version = HARNESS_PROTOCOL_VERSION,
        path = py_string(&solution_path.to_string_lossy()),
        name = py_string(function_name),
        unordered = if unordered { "True" } else { "False" },
        tests = py_string(&tests_json),
        load_exit = LOAD_FAILURE_EXIT_CODE,
    ))
}
