use crate::core::scheduler::FailurePolicy;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_path, validate_positive_number, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "namecheck")]
#[command(about = "Check which usernames from a wordlist are still available on a service")]
pub struct CliConfig {
    /// Path to the TOML file describing the services
    #[arg(long, default_value = "services.toml")]
    pub services: String,

    /// Name of the service to check against
    #[arg(long)]
    pub service: Option<String>,

    /// Wordlist file, one candidate per line
    #[arg(long)]
    pub wordlist: Option<String>,

    /// Delay between two dispatched requests, in milliseconds
    #[arg(long, default_value = "20")]
    pub interval_ms: u64,

    /// Override the service's maximum name length
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Directory holding the per-service checked/available logs
    #[arg(long, default_value = "./output")]
    pub output: String,

    /// Default request timeout, in seconds
    #[arg(long, default_value = "10")]
    pub timeout_secs: u64,

    /// Do not record failed candidates so that a later run retries them
    #[arg(long)]
    pub leave_failures_unchecked: bool,

    /// Only show what would be checked
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.leave_failures_unchecked {
            FailurePolicy::LeaveUnchecked
        } else {
            FailurePolicy::RecordAsChecked
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("services", &self.services)?;
        validate_path("output", &self.output)?;
        validate_positive_number("interval_ms", self.interval_ms as usize, 1)?;
        validate_positive_number("timeout_secs", self.timeout_secs as usize, 1)?;

        if let Some(wordlist) = &self.wordlist {
            validate_file_extension("wordlist", wordlist, &["txt"])?;
        }
        if let Some(max_length) = self.max_length {
            validate_positive_number("max_length", max_length, 1)?;
        }

        Ok(())
    }
}
