/// Complexity Estimation - Source Pattern Heuristics
///
/// Labels a solution with coarse time/space Big-O classes by scanning its text. This is a
/// hint for the learner, not analysis: it sees no control flow and is easily fooled.
///
/// Rules, per language:
/// 1. Start from time O(n), space O(n)
/// 2. A loop header followed by a second loop header is O(n²) time
/// 3. A hash container together with any loop resets to O(n)/O(n)
/// 4. Neither a hash container nor a list literal means O(1) space

use leetlocal_common::types::{BigO, ComplexityEstimate, Language};
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;

const JS_NESTED_LOOP: &str = r"(?s)for\s*\([^)]*\)\s*\{[^}]*for\s*\([^)]*\)";
const JS_HASH_CONTAINER: &str = r"new\s+(Map|Set)\(\)";
const JS_LOOP: &str = r"for\s*\(";
const JS_LIST: &str = r"\[\]";

const PY_NESTED_LOOP: &str = r"(?s)for\s+\w+\s+in\s+[^:]+:.*?for\s+\w+\s+in\s+";
const PY_HASH_CONTAINER: &str = r"\{\s*\}|dict\(\)";
const PY_LOOP: &str = r"for\s+\w+\s+in\s+";
const PY_LIST: &str = r"\[\s*\]|list\(\)";

struct Patterns {
    nested_loop: Regex,
    hash_container: Regex,
    single_loop: Regex,
    list: Regex,
}

impl Patterns {
    fn compile(
        nested_loop: &str,
        hash_container: &str,
        single_loop: &str,
        list: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            nested_loop: Regex::new(nested_loop)?,
            hash_container: Regex::new(hash_container)?,
            single_loop: Regex::new(single_loop)?,
            list: Regex::new(list)?,
        })
    }

    fn estimate(&self, code: &str) -> ComplexityEstimate {
        let mut estimate = ComplexityEstimate::default();

        if self.nested_loop.is_match(code) {
            estimate.time = BigO::Quadratic;
        }

        let has_hash = self.hash_container.is_match(code);
        if has_hash && self.single_loop.is_match(code) {
            estimate.time = BigO::Linear;
            estimate.space = BigO::Linear;
        }

        if !has_hash && !self.list.is_match(code) {
            estimate.space = BigO::Constant;
        }

        estimate
    }
}

/// Compiled pattern sets for every supported language.
pub struct ComplexityAnalyzer {
    js: Patterns,
    python: Patterns,
}

impl ComplexityAnalyzer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            js: Patterns::compile(JS_NESTED_LOOP, JS_HASH_CONTAINER, JS_LOOP, JS_LIST)?,
            python: Patterns::compile(PY_NESTED_LOOP, PY_HASH_CONTAINER, PY_LOOP, PY_LIST)?,
        })
    }

    pub fn estimate_source(&self, code: &str, language: Language) -> ComplexityEstimate {
        match language {
            Language::Js => self.js.estimate(code),
            Language::Python => self.python.estimate(code),
        }
    }

    /// Read the solution file and estimate it.
    pub fn estimate(
        &self,
        solution_path: &Path,
        language: Language,
    ) -> io::Result<ComplexityEstimate> {
        let code = fs::read_to_string(solution_path)?;
        Ok(self.estimate_source(&code, language))
    }
}
