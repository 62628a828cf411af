pub mod config;
pub use config::{validate_domain, Config, DomainConfig, HistogramsConfig, ReportConfig};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MpticksError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("write failed: {0}")]
    WriteFailure(#[source] std::io::Error),
    #[error("failed decoding {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MpticksError>;
