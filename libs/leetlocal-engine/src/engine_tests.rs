/// Integration tests for both execution backends
///
/// These tests verify that:
/// 1. JavaScript solutions load in every supported export style and run in-process
/// 2. A candidate error fails one test and the batch continues
/// 3. Load failures abort the run before any test executes
/// 4. Subprocess failures map onto the right error kinds
/// 5. Sampled runs report original test positions
/// 6. The Python harness applies the same equality rules and survives noisy solutions
///
/// Tests that need a real Python interpreter are ignored by default.

#[cfg(test)]
mod execution_tests {
    use crate::config::LanguageConfigManager;
    use crate::engine::{EngineError, InProcessBackend, JsLoader, SubprocessBackend};
    use crate::executor::{self, RunRequest};
    use leetlocal_common::types::{
        ComparisonOptions, FunctionSignature, Language, ProblemDescriptor, TestCase, TestResult,
    };
    use leetlocal_common::Config;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    const TWO_SUM_JS: &str = r#"
/**
 * @param {number[]} nums
 * @param {number} target
 * @return {number[]}
 */
function twoSum(nums, target) {
  const seen = new Map();
  for (let i = 0; i < nums.length; i++) {
    const need = target - nums[i];
    if (seen.has(need)) return [i, seen.get(need)];
    seen.set(nums[i], i);
  }
  return [];
}

module.exports = twoSum;
"#;

    const TWO_SUM_PY: &str = r#"
def twoSum(nums, target):
    seen = {}
    for i, n in enumerate(nums):
        if target - n in seen:
            return [i, seen[target - n]]
        seen[n] = i
    return []
"#;

    fn descriptor(function: &str, unordered: bool) -> ProblemDescriptor {
        ProblemDescriptor {
            id: "two-sum".to_string(),
            title: "Two Sum".to_string(),
            difficulty: Default::default(),
            function: FunctionSignature {
                name: function.to_string(),
                params: vec!["nums".to_string(), "target".to_string()],
            },
            comparison: Some(ComparisonOptions { unordered }),
        }
    }

    fn tc(input: Value, output: Value) -> TestCase {
        TestCase {
            input: input.as_array().cloned().unwrap_or_default(),
            output,
        }
    }

    fn two_sum_tests() -> Vec<TestCase> {
        vec![
            tc(json!([[2, 7, 11, 15], 9]), json!([0, 1])),
            tc(json!([[3, 2, 4], 6]), json!([1, 2])),
            tc(json!([[3, 3], 6]), json!([0, 1])),
        ]
    }

    fn write_solution(tmp: &TempDir, name: &str, source: &str) -> PathBuf {
        let path = tmp.path().join(name);
        fs::write(&path, source).unwrap();
        path
    }

    fn js() -> InProcessBackend<JsLoader> {
        InProcessBackend::new(JsLoader)
    }

    /// Test: the reversed pair fails in ordered mode and passes in unordered mode
    #[test]
    fn test_js_ordered_vs_unordered() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.js", TWO_SUM_JS);

        let ordered = js().run(&path, "twoSum", &two_sum_tests(), false).unwrap();
        assert_eq!(ordered.len(), 3);
        assert!(ordered.iter().all(|r| !r.passed));
        assert_eq!(ordered[0].actual, Some(json!([1, 0])));

        let unordered = js().run(&path, "twoSum", &two_sum_tests(), true).unwrap();
        assert!(unordered.iter().all(|r| r.passed));
    }

    /// Test: every supported export style resolves the function
    #[test]
    fn test_js_export_styles() {
        let tmp = TempDir::new().unwrap();
        let tests = vec![tc(json!([2, 3]), json!(5))];

        let styles = [
            "module.exports = function (a, b) { return a + b; };",
            "function add(a, b) { return a + b; }\nmodule.exports = { add };",
            "exports.add = function (a, b) { return a + b; };",
            "function add(a, b) { return a + b; }",
        ];

        for (i, source) in styles.iter().enumerate() {
            let path = write_solution(&tmp, &format!("style{}.js", i), source);
            let results = js()
                .run(&path, "add", &tests, false)
                .unwrap_or_else(|e| panic!("style {} failed to load: {}", i, e));
            assert!(results[0].passed, "style {} returned {:?}", i, results[0].actual);
        }
    }

    /// Test: a throw at index 1 fails that test only
    #[test]
    fn test_js_exception_mid_batch() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(
            &tmp,
            "solution.js",
            r#"
module.exports = function (n) {
  if (n === 0) throw new Error("boom at zero");
  console.log("computing", n);
  return n * 2;
};
"#,
        );
        let tests = vec![
            tc(json!([1]), json!(2)),
            tc(json!([0]), json!(0)),
            tc(json!([4]), json!(8)),
        ];

        let results = js().run(&path, "double", &tests, false).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert_eq!(results[1].test_index, 1);
        assert_eq!(results[1].actual, None);
        assert!(results[1].error.as_deref().unwrap().contains("boom at zero"));
        assert!(results[2].passed);
    }

    /// Test: returning undefined is reported as null
    #[test]
    fn test_js_undefined_is_null() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.js", "module.exports = function () {};");

        let results = js()
            .run(&path, "f", &[tc(json!([]), Value::Null)], false)
            .unwrap();
        assert!(results[0].passed);
        assert_eq!(results[0].actual, Some(Value::Null));
    }

    /// Test: load failures abort before any test runs
    #[test]
    fn test_js_load_errors() {
        let tmp = TempDir::new().unwrap();
        let tests = two_sum_tests();

        let syntax = write_solution(&tmp, "syntax.js", "function twoSum(nums {");
        assert!(matches!(
            js().run(&syntax, "twoSum", &tests, false),
            Err(EngineError::LoadError { .. })
        ));

        let no_function = write_solution(&tmp, "empty.js", "const x = 1;");
        let err = js().run(&no_function, "twoSum", &tests, false).unwrap_err();
        assert!(err.to_string().contains("twoSum"));

        let throws = write_solution(&tmp, "throws.js", "throw new Error('top level');");
        assert!(matches!(
            js().run(&throws, "twoSum", &tests, false),
            Err(EngineError::LoadError { .. })
        ));

        let missing = tmp.path().join("missing.js");
        assert!(matches!(
            js().run(&missing, "twoSum", &tests, false),
            Err(EngineError::LoadError { .. })
        ));
    }

    /// Test: edits between runs are picked up (no caching)
    #[test]
    fn test_js_reloads_fresh() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.js", "module.exports = () => 1;");
        let tests = vec![tc(json!([]), json!(2))];

        assert!(!js().run(&path, "f", &tests, false).unwrap()[0].passed);

        fs::write(&path, "module.exports = () => 2;").unwrap();
        assert!(js().run(&path, "f", &tests, false).unwrap()[0].passed);
    }

    /// Test: sampled runs execute first/middle/last and keep original indices
    #[tokio::test]
    async fn test_sampled_run_reports_original_positions() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.js", "module.exports = (n) => n;");
        let tests: Vec<TestCase> = (0..5).map(|n| tc(json!([n]), json!(n))).collect();
        let descriptor = descriptor("identity", false);
        let manager = LanguageConfigManager::from_config(&Config::default());

        let request = RunRequest {
            descriptor: &descriptor,
            tests: &tests,
            language: Language::Js,
            solution_path: &path,
            sample: true,
        };
        let outcome = executor::execute(&request, &manager).await.unwrap();

        let indices: Vec<usize> = outcome.results.iter().map(|r| r.test_index).collect();
        assert_eq!(indices, vec![0, 2, 4]);
        assert_eq!(outcome.results[1].input, vec![json!(2)]);
        assert!(outcome.all_passed());
        assert!(!outcome.counts_as_solved());
        assert!(outcome.complexity.is_some());
    }

    fn python(command: &str) -> SubprocessBackend {
        SubprocessBackend::new(command, Duration::from_secs(10))
    }

    /// Test: a non-zero interpreter exit is an execution error
    #[tokio::test]
    async fn test_subprocess_nonzero_exit() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.py", TWO_SUM_PY);

        let err = python("false")
            .run(&path, &two_sum_tests(), &descriptor("twoSum", false), false)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ExecutionError { .. }), "{}", err);
    }

    /// Test: stdout that is not a result array is a protocol error
    #[tokio::test]
    async fn test_subprocess_garbage_stdout() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.py", TWO_SUM_PY);

        let err = python("echo")
            .run(&path, &two_sum_tests(), &descriptor("twoSum", false), false)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ProtocolError { .. }), "{}", err);
    }

    /// Test: test data far beyond the per-argument limit still reaches the interpreter
    #[tokio::test]
    async fn test_subprocess_large_test_set_spawns() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.py", "def total(nums):\n    return sum(nums)\n");
        let nums: Vec<i64> = (0..30_000).collect();
        let tests = vec![tc(json!([nums]), json!(449_985_000))];

        // `cat` echoes the harness file back, which proves it was spawned with the script.
        let err = python("cat")
            .run(&path, &tests, &descriptor("total", false), false)
            .await
            .unwrap_err();
        match err {
            EngineError::ProtocolError { stdout, .. } => {
                assert!(stdout.starts_with("# leetlocal python harness"));
                assert!(stdout.len() > 128 * 1024);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_subprocess_missing_interpreter() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.py", TWO_SUM_PY);

        let err = python("leetlocal-no-such-interpreter")
            .run(&path, &two_sum_tests(), &descriptor("twoSum", false), false)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::SpawnError { .. }), "{}", err);
    }

    /// Test: bad function names and missing files fail before spawning
    #[tokio::test]
    async fn test_subprocess_load_errors() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.py", TWO_SUM_PY);

        let err = python("false")
            .run(&path, &two_sum_tests(), &descriptor("two-sum", false), false)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::LoadError { .. }));

        let err = python("false")
            .run(
                Path::new("/nonexistent/solution.py"),
                &two_sum_tests(),
                &descriptor("twoSum", false),
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::LoadError { .. }));
    }

    /// Test: end-to-end Python run, ordered and unordered
    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_two_sum() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.py", TWO_SUM_PY);
        let backend = python("python3");

        let ordered = backend
            .run(&path, &two_sum_tests(), &descriptor("twoSum", false), false)
            .await
            .unwrap();
        assert!(ordered.iter().all(|r| !r.passed));
        assert_eq!(ordered[0].actual, Some(json!([1, 0])));

        let unordered = backend
            .run(&path, &two_sum_tests(), &descriptor("twoSum", true), true)
            .await
            .unwrap();
        assert!(unordered.iter().all(|r| r.passed));
    }

    /// Test: a raise at index 1 fails that test only, and prints do not corrupt stdout
    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_exception_mid_batch() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(
            &tmp,
            "solution.py",
            "def half(n):\n    print('dividing', n)\n    return 10 // n\n",
        );
        let tests = vec![
            tc(json!([5]), json!(2)),
            tc(json!([0]), json!(0)),
            tc(json!([10]), json!(1)),
        ];

        let results = python("python3")
            .run(&path, &tests, &descriptor("half", false), false)
            .await
            .unwrap();
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert!(results[1].error.as_deref().unwrap().starts_with("ZeroDivisionError"));
        assert!(results[2].passed);
    }

    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_missing_function() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.py", TWO_SUM_PY);

        let err = python("python3")
            .run(&path, &two_sum_tests(), &descriptor("threeSum", false), false)
            .await
            .unwrap_err();
        match err {
            EngineError::ExecutionError { status, stderr } => {
                assert_eq!(status, "code 3");
                assert!(stderr.contains("threeSum"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    /// Test: a hanging solution is killed at the deadline
    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_timeout() {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(
            &tmp,
            "solution.py",
            "import time\n\ndef slow(n):\n    time.sleep(30)\n    return n\n",
        );

        let backend = SubprocessBackend::new("python3", Duration::from_millis(500));
        let err = backend
            .run(&path, &[tc(json!([1]), json!(1))], &descriptor("slow", false), false)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Timeout { timeout_ms: 500 }));
    }

    async fn run_python(
        source: &str,
        function: &str,
        tests: &[TestCase],
        unordered: bool,
    ) -> Vec<TestResult> {
        let tmp = TempDir::new().unwrap();
        let path = write_solution(&tmp, "solution.py", source);
        python("python3")
            .run(&path, tests, &descriptor(function, unordered), unordered)
            .await
            .unwrap()
    }

    /// Test: unordered comparison sorts nested lists in the harness too
    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_nested_unordered() {
        let source = "def pairs():\n    return [[2, 1], [4, 3]]\n";
        let tests = vec![tc(json!([]), json!([[3, 4], [1, 2]]))];

        assert!(run_python(source, "pairs", &tests, true).await[0].passed);
        assert!(!run_python(source, "pairs", &tests, false).await[0].passed);
    }

    /// Test: objects compare by key set and recurse into list values
    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_object_with_lists() {
        let source = "def groups():\n    return {'b': [[2, 1]], 'a': [3, 1, 2]}\n";
        let tests = vec![
            tc(json!([]), json!({ "a": [1, 2, 3], "b": [[1, 2]] })),
            tc(json!([]), json!({ "a": [1, 2, 3] })),
        ];

        let unordered = run_python(source, "groups", &tests, true).await;
        assert!(unordered[0].passed);
        assert!(!unordered[1].passed);
        assert_eq!(unordered[0].actual, Some(json!({ "a": [3, 1, 2], "b": [[2, 1]] })));

        let ordered = run_python(source, "groups", &tests, false).await;
        assert!(!ordered[0].passed);
    }

    /// Test: tuples become arrays and sets become sorted arrays
    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_tuple_and_set_returns() {
        let source = "def as_tuple():\n    return (1, 2)\n\ndef as_set():\n    return {3, 1, 2}\n";

        let tuple = run_python(source, "as_tuple", &[tc(json!([]), json!([1, 2]))], false).await;
        assert!(tuple[0].passed);

        let set = run_python(source, "as_set", &[tc(json!([]), json!([1, 2, 3]))], false).await;
        assert!(set[0].passed);
        assert_eq!(set[0].actual, Some(json!([1, 2, 3])));
    }

    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_length_mismatch() {
        let source = "def two():\n    return [2, 1]\n";
        let results = run_python(source, "two", &[tc(json!([]), json!([1, 2, 3]))], true).await;
        assert!(!results[0].passed);
        assert!(results[0].error.is_none());
    }

    /// Test: prints at import time go to stderr, not into the result line
    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_top_level_print() {
        let source = "def f(n):\n    return n\n\nprint(f(3))\n";
        let tests = vec![tc(json!([1]), json!(1)), tc(json!([2]), json!(2))];

        let results = run_python(source, "f", &tests, false).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    /// Test: a non-finite return fails its own test and the batch continues
    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_non_finite_return() {
        let source = "def f(n):\n    return float('inf') if n == 0 else n\n";
        let tests = vec![
            tc(json!([1]), json!(1)),
            tc(json!([0]), json!(0)),
            tc(json!([2]), json!(2)),
        ];

        let results = run_python(source, "f", &tests, false).await;
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert_eq!(results[1].actual, None);
        assert!(results[1].error.as_deref().unwrap().starts_with("ValueError"));
        assert!(results[2].passed);
    }

    /// Test: a 30,000-element input runs end to end
    #[tokio::test]
    #[ignore] // Requires python3
    async fn test_python_large_input() {
        let nums: Vec<i64> = (0..30_000).collect();
        let tests = vec![tc(json!([nums]), json!(449_985_000))];

        let results = run_python("def total(nums):\n    return sum(nums)\n", "total", &tests, false).await;
        assert!(results[0].passed);
    }
}
