//! Shared types and persistence for leetlocal: problem descriptors, the on-disk problem
//! store and the progress ledger.

pub mod config;
pub mod ledger;
pub mod store;
pub mod types;

pub use config::Config;
pub use ledger::{LedgerError, ProgressLedger, ProgressStats};
pub use store::{ProblemScaffold, ProblemStore, StoreError};
