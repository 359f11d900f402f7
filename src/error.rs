use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Extraction failed for href `{href}`: {message}")]
    Extraction { href: String, message: String },

    #[error("No active engine to deliver {action}")]
    MissingTarget { action: &'static str },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("Config error: {0}")]
    Config(String),
}

impl From<tokio::task::JoinError> for ScoutError {
    fn from(err: tokio::task::JoinError) -> Self {
        ScoutError::Browser(err.to_string())
    }
}
