use thiserror::Error;

/// Common error types used across the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Endpoint {url} responded with status {status}{}", detail_suffix(.detail))]
    Endpoint {
        status: u16,
        url: String,
        /// `code: message` reported by the API in the error body, if any.
        detail: Option<String>,
    },

    #[error("API rejected the request (code {code}): {message}")]
    ApiRejected { code: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),

    #[error("Message send error: {0}")]
    Send(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

impl AppError {
    /// Only configuration problems stop the process; everything else waits for
    /// the next poll cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_))
    }

    /// Whether the failure came from a response we could not interpret.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            AppError::Parse(_) | AppError::UnknownStatus(_) | AppError::ApiRejected { .. }
        )
    }
}
