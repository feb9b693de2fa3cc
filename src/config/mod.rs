#[cfg(feature = "cli")]
pub mod cli;
pub mod services_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use services_config::{AvailabilityRule, ServiceDefinition, ServicesConfig};
