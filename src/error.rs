//! Error types shared by the client and its configuration.
//! Every fetch returns `Result<_, FetchError>`; the caller decides whether a
//! failure is surfaced or masked.

use thiserror::Error;

/// The two failure families a fetch can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport, // network, TLS, timeout, non-2xx status
    Parse,     // body not JSON, wrong shape, bad or missing date
}

#[derive(Error, Debug)]
pub enum FetchError {
    // ---------------------------
    // Transport
    // ---------------------------
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    // ---------------------------
    // Parsing
    // ---------------------------
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(_) | FetchError::HttpStatus(_) => ErrorKind::Transport,
            FetchError::Parse(_) | FetchError::MissingField(_) => ErrorKind::Parse,
        }
    }
}

impl From<ureq::Error> for FetchError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _resp) => FetchError::HttpStatus(code),
            ureq::Error::Transport(t) => FetchError::Transport(t.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

pub type FetchResult<T> = Result<T, FetchError>;
