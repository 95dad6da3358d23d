//! Execution side of leetlocal: runs candidate solutions against a problem's tests and
//! judges, estimates and reports the outcome.

pub mod complexity;
pub mod config;
pub mod engine;
pub mod evaluator;
pub mod executor;
pub mod harness;
pub mod reporter;

mod engine_tests;

pub use config::LanguageConfigManager;
pub use engine::{Backend, EngineError};
pub use executor::{RunOutcome, RunRequest};
pub use reporter::Reporter;
