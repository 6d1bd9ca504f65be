use std::fmt;

/// Errors a [`crate::StoreApi`] implementation may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network or transport failure (connection refused, reset, ...).
    Transport(String),
    /// The server answered with a non-success status (404 for unknown ids).
    Status { status: u16, url: String },
    /// The response body did not match the expected payload.
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport error: {msg}"),
            ApiError::Status { status, url } => write!(f, "http status {status} from {url}"),
            ApiError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
