use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Machine-readable failure tag carried by every [`SearchError`]
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Credential rejected by the remote API
    AuthFailed,
    /// Remote API throttled the request
    RateLimit,
    /// Any other remote or transport failure
    ApiError,
    /// The response could not be decoded or had no output
    MalformedResponse,
    /// Anything the pipeline did not anticipate
    UnknownError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthFailed => "AUTH_FAILED",
            ErrorCode::RateLimit => "RATE_LIMIT",
            ErrorCode::ApiError => "API_ERROR",
            ErrorCode::MalformedResponse => "MALFORMED_RESPONSE",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured search failure
///
/// The single error currency raised by the client and the service for
/// anything that is not a caller mistake. Callers branch on `code`.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("[{code}] {message}{}", render_details(.details))]
pub struct SearchError {
    pub code: ErrorCode,
    pub message: String,
    /// Auxiliary context (e.g. `retry_after`, `status`); empty when none
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl SearchError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&serde_json::Value> {
        self.details.get(key)
    }
}

fn render_details(details: &BTreeMap<String, serde_json::Value>) -> String {
    if details.is_empty() {
        return String::new();
    }
    let details = serde_json::to_string(details).unwrap_or_default();
    format!(" | Details: {details}")
}

/// Crate-level error: caller mistakes vs. search failures
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Search(#[from] SearchError),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// Failure tag, `None` for invalid input
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::InvalidInput(_) => None,
            Error::Search(e) => Some(e.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_details() {
        let err = SearchError::new(ErrorCode::AuthFailed, "Invalid API key");
        assert_eq!(err.to_string(), "[AUTH_FAILED] Invalid API key");
    }

    #[test]
    fn test_display_with_details() {
        let err = SearchError::new(ErrorCode::RateLimit, "API rate limit exceeded")
            .with_detail("retry_after", 30);
        assert_eq!(
            err.to_string(),
            r#"[RATE_LIMIT] API rate limit exceeded | Details: {"retry_after":30}"#
        );
    }

    #[test]
    fn test_search_error_survives_anyhow_round_trip() {
        let err = SearchError::new(ErrorCode::ApiError, "boom").with_detail("status", 502);
        let wrapped = anyhow::Error::from(err.clone());

        assert_eq!(wrapped.to_string(), err.to_string());
        assert_eq!(wrapped.downcast::<SearchError>().unwrap(), err);
    }

    #[test]
    fn test_error_code_accessor() {
        let err = Error::from(SearchError::new(ErrorCode::ApiError, "boom"));
        assert_eq!(err.code(), Some(ErrorCode::ApiError));
        assert_eq!(Error::invalid("empty").code(), None);
    }
}
