//! Error types for the NHL fantasy stats pipeline

use thiserror::Error;


pub type Result<T> = std::result::Result<T, NhlError>;

#[derive(Error, Debug)]
pub enum NhlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Failed to parse number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Invalid season id: {value} (expected e.g. 20252026)")]
    InvalidSeason { value: String },

    #[error("Invalid position: {position}")]
    InvalidPosition { position: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Request limiter closed")]
    LimiterClosed,
}

impl NhlError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NhlError::Status { status, .. } => Some(*status),
            NhlError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Transient failures worth another attempt: timeouts, connection
    /// problems, 5xx and 429. Client errors and bad payloads are final.
    pub fn is_transient(&self) -> bool {
        match self {
            NhlError::Status { status, .. } => *status == 429 || *status >= 500,
            NhlError::Http(e) => {
                if let Some(status) = e.status() {
                    return status.as_u16() == 429 || status.is_server_error();
                }
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}
