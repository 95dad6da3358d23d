use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Target language of a solution. Each language maps to exactly one execution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Js,
    Python,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Js, Language::Python];

    /// Directory name under `solutions/`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Language::Js => "js",
            Language::Python => "python",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            Language::Js => "js",
            Language::Python => "py",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Js => "JavaScript",
            Language::Python => "Python",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "js" | "javascript" => Ok(Language::Js),
            "python" | "py" => Ok(Language::Python),
            _ => Err(format!("unsupported language '{}' (expected js or python)", s)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Unknown,
}

impl Difficulty {
    pub const RATED: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Case-insensitive parse; returns `None` for anything other than easy/medium/hard.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Difficulty::parse(&raw).unwrap_or(Difficulty::Unknown))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOptions {
    #[serde(default)]
    pub unordered: bool,
}

/// Problem metadata as persisted in `problem.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDescriptor {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub function: FunctionSignature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonOptions>,
}

impl ProblemDescriptor {
    pub fn unordered(&self) -> bool {
        self.comparison.as_ref().map(|c| c.unordered).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Vec<Value>,
    pub output: Value,
}

/// Outcome of one test case. Shared wire shape between the host and the Python harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub passed: bool,
    pub test_index: usize,
    pub input: Vec<Value>,
    pub expected: Value,
    #[serde(default)]
    pub actual: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Coarse Big-O label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BigO {
    #[serde(rename = "O(1)")]
    Constant,
    #[serde(rename = "O(n)")]
    Linear,
    #[serde(rename = "O(n²)")]
    Quadratic,
}

impl fmt::Display for BigO {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BigO::Constant => "O(1)",
            BigO::Linear => "O(n)",
            BigO::Quadratic => "O(n²)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityEstimate {
    pub time: BigO,
    pub space: BigO,
}

impl Default for ComplexityEstimate {
    fn default() -> Self {
        Self {
            time: BigO::Linear,
            space: BigO::Linear,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedRecord {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub language: Language,
    pub solved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<ComplexityEstimate>,
}
