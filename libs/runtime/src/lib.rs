//! Shared runtime plumbing for the consultorio binaries: layered configuration,
//! logging bootstrap and home directory resolution.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, ApiConfig, AppConfig, CliArgs, LoggingConfig, Section, SessionConfig,
};
