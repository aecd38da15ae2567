//! Error types for the tracker integration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedmineError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Redmine returned status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("issue template error: {0}")]
    TemplateError(#[from] Box<handlebars::TemplateError>),

    #[error("issue template render error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    #[error("unknown template mode {0:?}, expected \"light\" or \"dark\"")]
    UnknownTemplateMode(String),
}

pub type Result<T> = std::result::Result<T, RedmineError>;
