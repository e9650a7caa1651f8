use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KiraError {
    #[error("invalid genome name: {0}")]
    InvalidGenomeName(String),

    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("genome not found: {0}")]
    GenomeNotFound(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("blacklist request failed: {0}")]
    BlacklistHttp(String),

    #[error("blacklist server returned status {status}: {message}")]
    BlacklistStatus { status: u16, message: String },

    #[error("failed to read FASTA {path}: {message}")]
    Fasta { path: String, message: String },
}
