//! Error types for chess-strategist-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Illegal move '{token}' on board: {fen}")]
    IllegalMove { token: String, fen: String },

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("PGN parsing error: {0}")]
    Pgn(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Branch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Errors caused by the request itself rather than by a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::InvalidFen { .. } | Error::IllegalMove { .. } | Error::Pgn(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
