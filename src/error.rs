use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

/// Invalid command-line configuration
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{option} must be a finite number greater than zero, got {value}")]
    NotPositive { option: &'static str, value: f64 },
    #[error("{option} must be finite and not negative, got {value}")]
    Negative { option: &'static str, value: f64 },
    #[error("{option} must have finite coordinates")]
    NonFiniteVector { option: &'static str },
}

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to create log file {}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to initialise logging")]
    LoggingInit(#[source] TryInitError),
}
