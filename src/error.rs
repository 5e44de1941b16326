use thiserror::Error;

#[derive(Error, Debug)]
pub enum EltError {
    #[error("Frame format error: expected {expected} bytes, got {actual}")]
    Format { expected: usize, actual: usize },

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<hyper::Error> for EltError {
    fn from(err: hyper::Error) -> Self {
        EltError::Transport(err.to_string())
    }
}

impl From<hyper::http::Error> for EltError {
    fn from(err: hyper::http::Error) -> Self {
        EltError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EltError>;
