pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::HttpExecutor, reporter::TracingReporter, storage::FileResultSink};
pub use config::ServicesConfig;
pub use crate::core::{
    candidates::{load_candidates, CandidateBatch},
    scheduler::{FailurePolicy, Scheduler},
};
pub use utils::error::{NamecheckError, Result};
