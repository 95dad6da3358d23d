/// Result Reporter - Human-Readable Run Summary
///
/// Renders a batch of `TestResult`s into the text the CLI prints to stdout. Rendering never
/// fails; colour is plain ANSI escapes and can be switched off for pipes and tests.

use crate::evaluator::passed_count;
use leetlocal_common::types::{ComplexityEstimate, TestResult};
use serde_json::Value;
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn report(
        &self,
        results: &[TestResult],
        title: &str,
        complexity: Option<&ComplexityEstimate>,
        sampled: bool,
    ) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        let mode = if sampled {
            format!(" (SAMPLING MODE - {} tests)", results.len())
        } else {
            String::new()
        };
        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "Testing: {}{}", title, mode);
        let _ = writeln!(out, "{}", rule);

        if let Some(estimate) = complexity {
            let _ = writeln!(out, "\nComplexity Analysis:");
            let _ = writeln!(out, "   Time:  {}", self.green(&estimate.time.to_string()));
            let _ = writeln!(out, "   Space: {}", self.green(&estimate.space.to_string()));
        }

        for result in results {
            self.write_test(&mut out, result);
        }

        let passed = passed_count(results);
        let total = results.len();

        let _ = writeln!(out, "\n{}", rule);
        if passed == total {
            let _ = writeln!(
                out,
                "{}",
                self.green(&format!("✓ All tests passed! ({}/{})", passed, total))
            );
        } else {
            let _ = writeln!(
                out,
                "{}",
                self.red(&format!(
                    "✗ {} test(s) failed. ({}/{} passed)",
                    total - passed,
                    passed,
                    total
                ))
            );
        }
        let _ = writeln!(out, "{}", rule);

        out
    }

    fn write_test(&self, out: &mut String, result: &TestResult) {
        let number = result.test_index + 1;

        if result.passed {
            let _ = writeln!(out, "\n{}", self.green(&format!("✓ Test {}: PASSED", number)));
            return;
        }

        let _ = writeln!(out, "\n{}", self.red(&format!("✗ Test {}: FAILED", number)));
        let _ = writeln!(out, "  Input:    {}", format_value(&Value::Array(result.input.clone())));
        let _ = writeln!(out, "  Expected: {}", format_value(&result.expected));
        let actual = match &result.actual {
            Some(value) => format_value(value),
            None => "undefined".to_string(),
        };
        let _ = writeln!(out, "  Actual:   {}", actual);

        if let Some(error) = &result.error {
            let _ = writeln!(out, "{}", self.red(&format!("  Error:    {}", error)));
        }
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Strings print bare, everything else as compact JSON.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leetlocal_common::types::BigO;
    use serde_json::json;

    fn result(index: usize, passed: bool, actual: Option<Value>, error: Option<&str>) -> TestResult {
        TestResult {
            passed,
            test_index: index,
            input: vec![json!([2, 7, 11, 15]), json!(9)],
            expected: json!([0, 1]),
            actual,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_all_passed_footer() {
        let results = vec![result(0, true, Some(json!([0, 1])), None)];
        let text = Reporter::new(false).report(&results, "Two Sum", None, false);

        assert!(text.contains("Testing: Two Sum\n"));
        assert!(text.contains("✓ Test 1: PASSED"));
        assert!(text.contains("✓ All tests passed! (1/1)"));
        assert!(!text.contains("Complexity Analysis"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_failure_details() {
        let results = vec![
            result(0, true, Some(json!([0, 1])), None),
            result(4, false, Some(json!([1, 0])), None),
            result(9, false, None, Some("TypeError: nums is undefined")),
        ];
        let text = Reporter::new(false).report(&results, "Two Sum", None, true);

        assert!(text.contains("Testing: Two Sum (SAMPLING MODE - 3 tests)"));
        assert!(text.contains("✗ Test 5: FAILED"));
        assert!(text.contains("  Input:    [[2,7,11,15],9]"));
        assert!(text.contains("  Expected: [0,1]"));
        assert!(text.contains("  Actual:   [1,0]"));
        assert!(text.contains("✗ Test 10: FAILED"));
        assert!(text.contains("  Actual:   undefined"));
        assert!(text.contains("  Error:    TypeError: nums is undefined"));
        assert!(text.contains("✗ 2 test(s) failed. (1/3 passed)"));
    }

    #[test]
    fn test_sampled_header_counts_tests_run() {
        let results = vec![
            result(0, true, Some(json!([0, 1])), None),
            result(1, true, Some(json!([0, 1])), None),
        ];
        let text = Reporter::new(false).report(&results, "Two Sum", None, true);

        assert!(text.contains("Testing: Two Sum (SAMPLING MODE - 2 tests)"));
        assert!(text.contains("✓ All tests passed! (2/2)"));
    }

    #[test]
    fn test_complexity_block_and_color() {
        let estimate = ComplexityEstimate {
            time: BigO::Quadratic,
            space: BigO::Constant,
        };
        let results = vec![result(0, true, Some(json!([0, 1])), None)];
        let text = Reporter::new(true).report(&results, "Two Sum", Some(&estimate), false);

        assert!(text.contains("Complexity Analysis:"));
        assert!(text.contains("   Time:  \x1b[32mO(n²)\x1b[0m"));
        assert!(text.contains("   Space: \x1b[32mO(1)\x1b[0m"));
    }

    #[test]
    fn test_strings_print_bare() {
        assert_eq!(format_value(&json!("abc")), "abc");
        assert_eq!(format_value(&Value::Null), "null");
        assert_eq!(format_value(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
