/// Run Executor - High-Level Orchestration
///
/// **Responsibility:**
/// Coordinate sampling, the execution backend and the complexity estimator to produce one
/// `RunOutcome` for a (problem, language) pair.
///
/// **Architecture:**
/// 1. Pick the tests to run (all, or the first/middle/last sample)
/// 2. Run them on the backend for the language (engine.rs)
/// 3. Map result indices back to positions in the full test set
/// 4. Attach the advisory complexity estimate (complexity.rs)
///
/// This module is the glue layer - it knows nothing about:
/// - How code executes (engine's job)
/// - How equality works (evaluator's job)
/// - How results are displayed (reporter's job)

use crate::complexity::ComplexityAnalyzer;
use crate::config::LanguageConfigManager;
use crate::engine::EngineError;
use crate::evaluator;
use leetlocal_common::types::{ComplexityEstimate, Language, ProblemDescriptor, TestCase, TestResult};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Most tests a sampled run executes.
pub const SAMPLE_SIZE: usize = 3;

/// Indices of the tests a sampled run executes: first, middle and last when there are more
/// than three tests, otherwise every test.
pub fn select_sample(total: usize) -> Vec<usize> {
    if total <= SAMPLE_SIZE {
        (0..total).collect()
    } else {
        vec![0, total / 2, total - 1]
    }
}

pub struct RunRequest<'a> {
    pub descriptor: &'a ProblemDescriptor,
    pub tests: &'a [TestCase],
    pub language: Language,
    pub solution_path: &'a Path,
    pub sample: bool,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub results: Vec<TestResult>,
    pub sampled: bool,
    pub complexity: Option<ComplexityEstimate>,
}

impl RunOutcome {
    pub fn all_passed(&self) -> bool {
        evaluator::all_passed(&self.results)
    }

    /// Only full runs that pass every test count as a solve.
    pub fn counts_as_solved(&self) -> bool {
        !self.sampled && self.all_passed()
    }
}

/// Run a problem's tests against one solution.
pub async fn execute(
    request: &RunRequest<'_>,
    config_manager: &LanguageConfigManager,
) -> Result<RunOutcome, EngineError> {
    let start = Instant::now();

    let indices = if request.sample {
        select_sample(request.tests.len())
    } else {
        (0..request.tests.len()).collect()
    };
    let selected: Vec<TestCase> = indices.iter().map(|&i| request.tests[i].clone()).collect();

    let backend = config_manager.backend_for(request.language);

    info!(
        problem_id = %request.descriptor.id,
        language = %request.language,
        backend = backend.kind(),
        test_count = selected.len(),
        total_tests = request.tests.len(),
        sampled = request.sample,
        "Starting run"
    );

    let complexity = estimate_complexity(request.solution_path, request.language);

    let mut results = backend
        .run(
            request.solution_path,
            &selected,
            request.descriptor,
            request.descriptor.unordered(),
        )
        .await?;

    for result in &mut results {
        if let Some(&original) = indices.get(result.test_index) {
            result.test_index = original;
        }
    }

    info!(
        problem_id = %request.descriptor.id,
        passed = evaluator::passed_count(&results),
        total = results.len(),
        execution_ms = start.elapsed().as_millis() as u64,
        "Run finished"
    );

    Ok(RunOutcome {
        results,
        sampled: request.sample,
        complexity,
    })
}

fn estimate_complexity(path: &Path, language: Language) -> Option<ComplexityEstimate> {
    let analyzer = match ComplexityAnalyzer::new() {
        Ok(analyzer) => analyzer,
        Err(e) => {
            warn!(error = %e, "Complexity patterns failed to compile");
            return None;
        }
    };

    match analyzer.estimate(path, language) {
        Ok(estimate) => Some(estimate),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not estimate complexity");
            None
        }
    }
}
