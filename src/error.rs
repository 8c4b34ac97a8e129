use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that stop the client from starting or running its terminal.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Token store error at {path}: {source}")]
    TokenStore {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No usable data directory; pass --token-file")]
    NoDataDir,

    #[error("Cannot build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Failures of a single backend exchange. None of these are fatal; the
/// controller turns them into a notice and stays in its current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Credential or validation failure reported by the server.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Missing, expired or invalid bearer token.
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("Cannot reach server: {0}")]
    Network(String),

    #[error("Unexpected server response: {0}")]
    Malformed(String),
}
