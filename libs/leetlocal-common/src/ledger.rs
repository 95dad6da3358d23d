use crate::store::ProblemStore;
use crate::types::{ComplexityEstimate, Difficulty, Language, SolvedRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to write progress file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to back up unreadable progress file to {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize progress data: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProgressFile {
    #[serde(default)]
    solved: Vec<SolvedRecord>,
}

/// Aggregate view over the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    pub total: usize,
    pub solved: usize,
    pub by_difficulty: BTreeMap<Difficulty, usize>,
    pub by_language: BTreeMap<Language, usize>,
    pub recent: Vec<SolvedRecord>,
}

impl ProgressStats {
    pub fn difficulty_count(&self, difficulty: Difficulty) -> usize {
        self.by_difficulty.get(&difficulty).copied().unwrap_or(0)
    }
}

/// Append-only record of first-time solves.
///
/// Every operation is a whole-file read-modify-write. Two processes writing at once can lose
/// an update; the tool assumes a single user running one command at a time.
#[derive(Debug, Clone)]
pub struct ProgressLedger {
    path: PathBuf,
}

impl ProgressLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, oldest first. Missing or unreadable files count as an empty ledger.
    pub fn records(&self) -> Vec<SolvedRecord> {
        self.load().solved
    }

    pub fn mark_solved(
        &self,
        id: &str,
        title: &str,
        difficulty: Difficulty,
        language: Language,
        complexity: Option<ComplexityEstimate>,
    ) -> Result<bool, LedgerError> {
        self.mark_solved_at(id, title, difficulty, language, complexity, Utc::now())
    }

    /// Same as [`mark_solved`](Self::mark_solved) with an explicit timestamp.
    pub fn mark_solved_at(
        &self,
        id: &str,
        title: &str,
        difficulty: Difficulty,
        language: Language,
        complexity: Option<ComplexityEstimate>,
        solved_at: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        let mut progress = match self.read() {
            Some(progress) => progress,
            None => {
                self.back_up_unreadable()?;
                ProgressFile::default()
            }
        };

        if progress
            .solved
            .iter()
            .any(|r| r.id == id && r.language == language)
        {
            debug!(problem_id = id, language = %language, "Already recorded");
            return Ok(false);
        }

        progress.solved.push(SolvedRecord {
            id: id.to_string(),
            title: title.to_string(),
            difficulty,
            language,
            solved_at,
            complexity,
        });

        self.save(&progress)?;
        Ok(true)
    }

    pub fn stats(&self, store: &ProblemStore) -> ProgressStats {
        self.stats_with_total(store.list_all().len())
    }

    pub fn stats_with_total(&self, total: usize) -> ProgressStats {
        let solved = self.records();

        let mut by_difficulty: BTreeMap<Difficulty, usize> =
            Difficulty::RATED.iter().map(|d| (*d, 0)).collect();
        let mut by_language = BTreeMap::new();
        let mut unique = HashSet::new();

        for record in &solved {
            unique.insert(record.id.as_str());
            *by_difficulty.entry(record.difficulty).or_insert(0) += 1;
            *by_language.entry(record.language).or_insert(0) += 1;
        }

        let solved_count = unique.len();

        let mut recent = solved;
        recent.sort_by(|a, b| b.solved_at.cmp(&a.solved_at));
        recent.truncate(RECENT_LIMIT);

        ProgressStats {
            total,
            solved: solved_count,
            by_difficulty,
            by_language,
            recent,
        }
    }

    fn load(&self) -> ProgressFile {
        self.read().unwrap_or_default()
    }

    /// `None` when the file exists but is not a valid ledger.
    fn read(&self) -> Option<ProgressFile> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Some(ProgressFile::default()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read progress file, starting fresh");
                return Some(ProgressFile::default());
            }
        };

        match serde_json::from_str(&content) {
            Ok(progress) => Some(progress),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not parse progress file, starting fresh");
                None
            }
        }
    }

    /// `<ledger>.bak` next to the ledger file.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    /// Move an unparsable ledger aside so the next write does not destroy it.
    fn back_up_unreadable(&self) -> Result<(), LedgerError> {
        let backup = self.backup_path();
        fs::rename(&self.path, &backup).map_err(|source| LedgerError::Backup {
            path: backup.clone(),
            source,
        })?;
        warn!(path = %self.path.display(), backup = %backup.display(), "Moved unreadable progress file aside");
        Ok(())
    }

    fn save(&self, progress: &ProgressFile) -> Result<(), LedgerError> {
        let mut json = serde_json::to_string_pretty(progress)?;
        json.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LedgerError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        fs::write(&self.path, json).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
