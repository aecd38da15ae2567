//! Error types for the QRadar client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QRadarError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("QRadar returned status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("search submission response carried no search_id")]
    MissingSearchId,
}

pub type Result<T> = std::result::Result<T, QRadarError>;
