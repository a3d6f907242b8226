use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTypeError {
    #[error("content type is empty")]
    Empty,

    #[error("missing '/' separator in media type: {0}")]
    MissingSeparator(String),

    #[error("invalid token in media type: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("XML error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTML tidy error: {0}")]
    Html(String),
}

pub type FormatResult<T> = Result<T, FormatError>;
