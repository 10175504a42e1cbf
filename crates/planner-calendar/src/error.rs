//! Calendar-specific error types.

use thiserror::Error;

/// Failure to read a `YYYY-MM-DD` date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid ISO date: {0}")]
    InvalidFormat(String),
}

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Token expired")]
    TokenExpired,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Invalid event data: {0}")]
    InvalidEventData(String),

    #[error("Invalid date: {0}")]
    InvalidDate(#[from] DateError),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CalendarError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Please sign in to your Google account".to_string(),
            Self::TokenExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::CalendarNotFound(_) => "Calendar not found".to_string(),
            Self::InvalidEventData(msg) => format!("Invalid event: {}", msg),
            Self::InvalidDate(e) => format!("Invalid date: {}", e),
            Self::ApiError(msg) => format!("Calendar error: {}", msg),
            Self::NetworkError(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether this error should trigger a token refresh.
    pub fn should_refresh_token(&self) -> bool {
        matches!(self, Self::TokenExpired | Self::AuthRequired)
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::NetworkError(_))
    }
}
