/// Execution Engine - Running Candidate Solutions
///
/// **Core Responsibility:**
/// Invoke a user's function once per test case and hand each outcome to the evaluator.
///
/// **Backends (closed set, chosen by language):**
/// - `InProcessBackend` (JavaScript): evaluates the solution inside an embedded JavaScript
///   engine and calls the function directly. A fresh engine context is built on every run,
///   so edits to the solution are always picked up.
/// - `SubprocessBackend` (Python): generates a harness script (see `harness.rs`), runs it
///   under the configured interpreter and parses the JSON result line. The child owns all
///   comparison logic for its language.
///
/// **Failure Model:**
/// - Load failures abort the run (`LoadError`)
/// - An exception inside one test becomes a failed `TestResult`; later tests still run
/// - Subprocess failures abort the run (`ExecutionError`, `ProtocolError`, `Timeout`)
///
/// No sandboxing: candidate code runs with the privileges of the host process.

use crate::evaluator::{evaluate_test, Invocation};
use crate::harness;
use boa_engine::{Context, JsError, JsObject, JsValue, Source};
use leetlocal_common::types::{ProblemDescriptor, TestCase, TestResult};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Safety limit to keep pathological files out of the engine.
const MAX_SOLUTION_BYTES: u64 = 1024 * 1024; // 1MB

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load solution {}: {reason}", .path.display())]
    LoadError { path: PathBuf, reason: String },
    #[error("Failed to write harness script: {0}")]
    HarnessError(#[source] io::Error),
    #[error("Failed to spawn {command}: {source}")]
    SpawnError {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("Solution process exited with {status}\n{stderr}")]
    ExecutionError { status: String, stderr: String },
    #[error("Failed to parse test results: {reason}\nstdout: {stdout}\nstderr: {stderr}")]
    ProtocolError {
        reason: String,
        stdout: String,
        stderr: String,
    },
    #[error("Solution process timed out after {timeout_ms}ms and was killed")]
    Timeout { timeout_ms: u64 },
}

impl EngineError {
    fn load(path: &Path, reason: impl Into<String>) -> Self {
        EngineError::LoadError {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Something that can be called with positional JSON arguments.
///
/// `Err` carries the message of an error raised by the callee.
pub trait Candidate {
    fn invoke(&mut self, args: &[Value]) -> Result<Value, String>;
}

impl<F> Candidate for F
where
    F: FnMut(&[Value]) -> Result<Value, String>,
{
    fn invoke(&mut self, args: &[Value]) -> Result<Value, String> {
        self(args)
    }
}

/// Capability to turn (location, symbol name) into an invocable candidate.
pub trait Loadable {
    type Output: Candidate;

    fn load(&self, location: &Path, symbol: &str) -> Result<Self::Output, EngineError>;
}

/// Run every test against an already-loaded candidate, in order.
pub fn run_candidate<C>(candidate: &mut C, tests: &[TestCase], unordered: bool) -> Vec<TestResult>
where
    C: Candidate + ?Sized,
{
    let mut results = Vec::with_capacity(tests.len());

    for (index, test_case) in tests.iter().enumerate() {
        let start = Instant::now();
        let invocation = match candidate.invoke(&test_case.input) {
            Ok(value) => Invocation::Returned(value),
            Err(message) => {
                warn!(test_index = index, error = %message, "Candidate raised");
                Invocation::Raised(message)
            }
        };

        let result = evaluate_test(index, test_case, invocation, unordered);
        debug!(
            test_index = index,
            passed = result.passed,
            execution_us = start.elapsed().as_micros() as u64,
            "Test evaluated"
        );
        results.push(result);
    }

    results
}

/// Shim evaluated before the solution so CommonJS-style files work unchanged.
const JS_PRELUDE: &str = r#"
var module = { exports: {} };
var exports = module.exports;
var console = (function () {
  var noop = function () {};
  return { log: noop, info: noop, warn: noop, error: noop, debug: noop };
})();
function require(name) {
  throw new Error("require('" + name + "') is not available to in-process solutions");
}
"#;

/// Loads JavaScript solutions into a fresh embedded engine context.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsLoader;

pub struct JsCandidate {
    context: Context,
    function: JsObject,
}

impl JsLoader {
    fn resolve(context: &mut Context, symbol: &str) -> Result<Option<JsObject>, JsError> {
        let name = Value::String(symbol.to_string()).to_string();
        let from_exports = format!(
            "(function () {{ var e = module.exports; \
               if (typeof e === 'function') return e; \
               if (e && typeof e[{name}] === 'function') return e[{name}]; \
               return undefined; }})()"
        );
        let value = context.eval(Source::from_bytes(&from_exports))?;
        if let Some(function) = value.as_callable() {
            return Ok(Some(function.clone()));
        }

        if harness::is_valid_identifier(symbol) {
            let global = format!("typeof {symbol} === 'function' ? {symbol} : undefined");
            let value = context.eval(Source::from_bytes(&global))?;
            if let Some(function) = value.as_callable() {
                return Ok(Some(function.clone()));
            }
        }

        Ok(None)
    }
}

impl Loadable for JsLoader {
    type Output = JsCandidate;

    fn load(&self, location: &Path, symbol: &str) -> Result<JsCandidate, EngineError> {
        let metadata = fs::metadata(location)
            .map_err(|e| EngineError::load(location, format!("cannot read file: {}", e)))?;
        if metadata.len() > MAX_SOLUTION_BYTES {
            return Err(EngineError::load(
                location,
                format!("file exceeds {} bytes", MAX_SOLUTION_BYTES),
            ));
        }

        let source = fs::read_to_string(location)
            .map_err(|e| EngineError::load(location, format!("cannot read file: {}", e)))?;

        let mut context = Context::default();
        context
            .eval(Source::from_bytes(JS_PRELUDE))
            .map_err(|e| EngineError::load(location, describe_js_error(e, &mut context)))?;
        context
            .eval(Source::from_bytes(&source))
            .map_err(|e| EngineError::load(location, describe_js_error(e, &mut context)))?;

        let function = match JsLoader::resolve(&mut context, symbol) {
            Ok(Some(function)) => function,
            Ok(None) => {
                return Err(EngineError::load(
                    location,
                    format!("solution must export a function (looked for `{}`)", symbol),
                ))
            }
            Err(e) => return Err(EngineError::load(location, describe_js_error(e, &mut context))),
        };

        Ok(JsCandidate { context, function })
    }
}

impl Candidate for JsCandidate {
    fn invoke(&mut self, args: &[Value]) -> Result<Value, String> {
        let mut js_args = Vec::with_capacity(args.len());
        for arg in args {
            let value = JsValue::from_json(arg, &mut self.context)
                .map_err(|e| describe_js_error(e, &mut self.context))?;
            js_args.push(value);
        }

        let returned = self
            .function
            .call(&JsValue::undefined(), &js_args, &mut self.context)
            .map_err(|e| describe_js_error(e, &mut self.context))?;

        if returned.is_undefined() {
            return Ok(Value::Null);
        }

        returned
            .to_json(&mut self.context)
            .map_err(|e| {
                format!(
                    "return value is not JSON-serializable: {}",
                    describe_js_error(e, &mut self.context)
                )
            })
    }
}

fn describe_js_error(error: JsError, context: &mut Context) -> String {
    match error.try_native(context) {
        Ok(native) => native.to_string(),
        Err(_) => error.to_string(),
    }
}

/// Runs candidates in the host process through a [`Loadable`].
#[derive(Debug, Clone, Default)]
pub struct InProcessBackend<L = JsLoader> {
    loader: L,
}

impl<L: Loadable> InProcessBackend<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load `symbol` from `location` (fresh, never cached) and run every test.
    #[instrument(
        skip(self, location, tests),
        fields(location = %location.display(), test_count = tests.len())
    )]
    pub fn run(
        &self,
        location: &Path,
        symbol: &str,
        tests: &[TestCase],
        unordered: bool,
    ) -> Result<Vec<TestResult>, EngineError> {
        let mut candidate = self.loader.load(location, symbol)?;
        info!("Candidate loaded");
        Ok(run_candidate(&mut candidate, tests, unordered))
    }
}

/// Runs Python candidates through a generated harness in a child process.
#[derive(Debug, Clone)]
pub struct SubprocessBackend {
    command: String,
    timeout: Duration,
}

impl SubprocessBackend {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    #[instrument(
        skip(self, location, tests, descriptor),
        fields(
            problem_id = %descriptor.id,
            location = %location.display(),
            test_count = tests.len(),
            interpreter = %self.command
        )
    )]
    pub async fn run(
        &self,
        location: &Path,
        tests: &[TestCase],
        descriptor: &ProblemDescriptor,
        unordered: bool,
    ) -> Result<Vec<TestResult>, EngineError> {
        let symbol = &descriptor.function.name;
        if !harness::is_valid_identifier(symbol) {
            return Err(EngineError::load(
                location,
                format!("`{}` is not a valid Python function name", symbol),
            ));
        }

        let absolute = fs::canonicalize(location)
            .map_err(|e| EngineError::load(location, format!("cannot resolve path: {}", e)))?;

        let script = harness::generate(&absolute, symbol, tests, unordered).map_err(|e| {
            EngineError::load(location, format!("cannot encode test cases: {}", e))
        })?;

        let (stdout, stderr) = self.execute(&script).await?;
        parse_results(&stdout, &stderr, tests.len())
    }

    /// Spawn the interpreter on `script` and collect both streams until it exits.
    ///
    /// The script goes through a temp file rather than `-c`; embedded test data easily
    /// exceeds the per-argument limit of the OS.
    async fn execute(&self, script: &str) -> Result<(String, String), EngineError> {
        let start = Instant::now();

        let mut script_file = tempfile::Builder::new()
            .prefix("leetlocal-harness-")
            .suffix(".py")
            .tempfile()
            .map_err(EngineError::HarnessError)?;
        script_file
            .write_all(script.as_bytes())
            .and_then(|_| script_file.flush())
            .map_err(EngineError::HarnessError)?;
        debug!(script = %script_file.path().display(), bytes = script.len(), "Harness written");

        let mut child = Command::new(&self.command)
            .arg(script_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::SpawnError {
                command: self.command.clone(),
                source,
            })?;

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();

        let collect = async {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();

            let read_stdout = async {
                if let Some(pipe) = stdout_pipe.as_mut() {
                    pipe.read_to_end(&mut stdout).await?;
                }
                Ok::<(), io::Error>(())
            };
            let read_stderr = async {
                if let Some(pipe) = stderr_pipe.as_mut() {
                    pipe.read_to_end(&mut stderr).await?;
                }
                Ok::<(), io::Error>(())
            };

            let (out, err, status) = tokio::join!(read_stdout, read_stderr, child.wait());
            out?;
            err?;
            let status = status?;
            Ok::<_, io::Error>((status, stdout, stderr))
        };

        let outcome = tokio::time::timeout(self.timeout, collect).await;

        let (status, stdout, stderr) = match outcome {
            Ok(Ok(collected)) => collected,
            Ok(Err(source)) => {
                return Err(EngineError::SpawnError {
                    command: self.command.clone(),
                    source,
                })
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(timeout_ms, "Solution process timed out, killing it");
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed-out process");
                }
                return Err(EngineError::Timeout { timeout_ms });
            }
        };

        let stdout = String::from_utf8_lossy(&stdout).into_owned();
        let stderr = String::from_utf8_lossy(&stderr).into_owned();

        info!(
            exit_code = ?status.code(),
            execution_ms = start.elapsed().as_millis() as u64,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "Solution process exited"
        );

        if !status.success() {
            let status = match status.code() {
                Some(code) => format!("code {}", code),
                None => "a signal".to_string(),
            };
            return Err(EngineError::ExecutionError { status, stderr });
        }

        Ok((stdout, stderr))
    }
}

/// Decode the harness result line.
pub fn parse_results(
    stdout: &str,
    stderr: &str,
    expected_count: usize,
) -> Result<Vec<TestResult>, EngineError> {
    let protocol_error = |reason: String| EngineError::ProtocolError {
        reason,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    };

    let results: Vec<TestResult> =
        serde_json::from_str(stdout.trim()).map_err(|e| protocol_error(e.to_string()))?;

    if results.len() != expected_count {
        return Err(protocol_error(format!(
            "expected {} results, got {}",
            expected_count,
            results.len()
        )));
    }

    Ok(results)
}

/// The two execution backends. Selected by target language.
#[derive(Debug, Clone)]
pub enum Backend {
    InProcess(InProcessBackend<JsLoader>),
    Subprocess(SubprocessBackend),
}

impl Backend {
    pub async fn run(
        &self,
        location: &Path,
        tests: &[TestCase],
        descriptor: &ProblemDescriptor,
        unordered: bool,
    ) -> Result<Vec<TestResult>, EngineError> {
        match self {
            Backend::InProcess(backend) => {
                backend.run(location, &descriptor.function.name, tests, unordered)
            }
            Backend::Subprocess(backend) => {
                backend.run(location, tests, descriptor, unordered).await
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Backend::InProcess(_) => "in-process",
            Backend::Subprocess(_) => "subprocess",
        }
    }
}
