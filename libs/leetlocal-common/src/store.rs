use crate::types::{
    ComparisonOptions, Difficulty, FunctionSignature, Language, ProblemDescriptor, TestCase,
};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// On-disk layout semantics. Every path the harness touches is derived from these names so
/// the CLI, the store and the generated harness never disagree about where things live.
pub const DESCRIPTOR_FILE: &str = "problem.json";
pub const TESTS_FILE: &str = "tests.json";
pub const STATEMENT_FILE: &str = "problem.md";
pub const SOLUTIONS_DIR: &str = "solutions";
pub const SOLUTION_STEM: &str = "solution";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Problem not found: {id} ({} missing)", .path.display())]
    NotFound { id: String, path: PathBuf },
    #[error("Invalid {file} for {id}: {reason}")]
    InvalidFormat {
        id: String,
        file: &'static str,
        reason: String,
    },
    #[error("tests.json for {id} contains no test cases")]
    EmptyTestSet { id: String },
    #[error("Problem \"{id}\" already exists")]
    AlreadyExists { id: String },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn invalid(id: &str, file: &'static str, reason: impl Into<String>) -> Self {
        StoreError::InvalidFormat {
            id: id.to_string(),
            file,
            reason: reason.into(),
        }
    }
}

/// Everything needed to scaffold a new problem directory.
#[derive(Debug, Clone)]
pub struct ProblemScaffold {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub function_name: String,
    pub params: Vec<String>,
    pub unordered: bool,
}

/// Read access to the persisted problem tree. Nothing is cached: every call goes to disk.
#[derive(Debug, Clone)]
pub struct ProblemStore {
    root: PathBuf,
}

impl ProblemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn problem_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    pub fn descriptor_path(&self, id: &str) -> PathBuf {
        self.problem_dir(id).join(DESCRIPTOR_FILE)
    }

    pub fn tests_path(&self, id: &str) -> PathBuf {
        self.problem_dir(id).join(TESTS_FILE)
    }

    /// Where the solution for `language` lives. Pure path arithmetic, no I/O.
    pub fn solution_path(&self, id: &str, language: Language) -> PathBuf {
        self.problem_dir(id)
            .join(SOLUTIONS_DIR)
            .join(language.dir_name())
            .join(format!("{}.{}", SOLUTION_STEM, language.file_extension()))
    }

    pub fn solution_exists(&self, id: &str, language: Language) -> bool {
        self.solution_path(id, language).is_file()
    }

    pub fn load_descriptor(&self, id: &str) -> Result<ProblemDescriptor, StoreError> {
        let path = self.descriptor_path(id);
        let raw = read_json(id, &path, DESCRIPTOR_FILE)?;

        validate_descriptor(id, &raw)?;

        let descriptor: ProblemDescriptor = serde_json::from_value(raw)
            .map_err(|e| StoreError::invalid(id, DESCRIPTOR_FILE, e.to_string()))?;

        if descriptor.id != id {
            warn!(
                problem_id = id,
                declared_id = %descriptor.id,
                "Descriptor id does not match its directory name"
            );
        }

        Ok(descriptor)
    }

    pub fn load_tests(&self, id: &str) -> Result<Vec<TestCase>, StoreError> {
        let path = self.tests_path(id);
        let raw = read_json(id, &path, TESTS_FILE)?;

        if !raw.is_array() {
            return Err(StoreError::invalid(
                id,
                TESTS_FILE,
                "expected an array of test cases",
            ));
        }

        let tests: Vec<TestCase> = serde_json::from_value(raw)
            .map_err(|e| StoreError::invalid(id, TESTS_FILE, e.to_string()))?;

        if tests.is_empty() {
            return Err(StoreError::EmptyTestSet { id: id.to_string() });
        }

        debug!(problem_id = id, test_count = tests.len(), "Loaded test cases");
        Ok(tests)
    }

    /// Every loadable problem under the root, sorted by id. Broken entries are skipped with a
    /// warning instead of failing the listing.
    pub fn list_all(&self) -> Vec<ProblemDescriptor> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(root = %self.root.display(), error = %e, "Problems directory not readable");
                return Vec::new();
            }
        };

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        ids.sort();

        ids.into_iter()
            .filter_map(|id| match self.load_descriptor(&id) {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    warn!(problem_id = %id, error = %e, "Skipping invalid problem directory");
                    None
                }
            })
            .collect()
    }

    /// Create the directory tree for a new problem. `statement` becomes `problem.md`; the
    /// test list starts empty.
    pub fn create_problem(
        &self,
        scaffold: &ProblemScaffold,
        statement: &str,
    ) -> Result<ProblemDescriptor, StoreError> {
        let dir = self.problem_dir(&scaffold.id);
        if dir.exists() {
            return Err(StoreError::AlreadyExists {
                id: scaffold.id.clone(),
            });
        }

        for language in Language::ALL {
            let solutions = dir.join(SOLUTIONS_DIR).join(language.dir_name());
            fs::create_dir_all(&solutions).map_err(|e| StoreError::io(&solutions, e))?;
            let keep = solutions.join(".gitkeep");
            fs::write(&keep, "").map_err(|e| StoreError::io(&keep, e))?;
        }

        let descriptor = ProblemDescriptor {
            id: scaffold.id.clone(),
            title: scaffold.title.clone(),
            difficulty: scaffold.difficulty,
            function: FunctionSignature {
                name: scaffold.function_name.clone(),
                params: scaffold.params.clone(),
            },
            comparison: scaffold
                .unordered
                .then_some(ComparisonOptions { unordered: true }),
        };

        let descriptor_path = self.descriptor_path(&scaffold.id);
        write_pretty(&descriptor_path, &descriptor)?;

        let tests_path = self.tests_path(&scaffold.id);
        write_pretty(&tests_path, &Vec::<TestCase>::new())?;

        let statement_path = dir.join(STATEMENT_FILE);
        fs::write(&statement_path, statement).map_err(|e| StoreError::io(&statement_path, e))?;

        Ok(descriptor)
    }
}

fn read_json(id: &str, path: &Path, file: &'static str) -> Result<Value, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound {
                id: id.to_string(),
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    serde_json::from_str(&content)
        .map_err(|e| StoreError::invalid(id, file, format!("malformed JSON: {}", e)))
}

fn validate_descriptor(id: &str, raw: &Value) -> Result<(), StoreError> {
    let missing = |field: &str| StoreError::invalid(id, DESCRIPTOR_FILE, format!("missing {}", field));

    let non_empty_str = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    };

    if !raw.is_object() {
        return Err(StoreError::invalid(id, DESCRIPTOR_FILE, "expected a JSON object"));
    }
    if !non_empty_str(raw.get("id")) {
        return Err(missing("id"));
    }
    if !non_empty_str(raw.get("title")) {
        return Err(missing("title"));
    }
    if !non_empty_str(raw.pointer("/function/name")) {
        return Err(missing("function.name"));
    }
    if !raw.pointer("/function/params").map(Value::is_array).unwrap_or(false) {
        return Err(missing("function.params"));
    }
    Ok(())
}

fn write_pretty<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| {
        StoreError::io(path, io::Error::new(io::ErrorKind::InvalidData, e))
    })?;
    json.push('\n');
    fs::write(path, json).map_err(|e| StoreError::io(path, e))
}
