use serde_json::Value;
use thiserror::Error;

use crate::validation::ValidationError;

/// Shown when an error response carries no readable message
pub const FALLBACK_MESSAGE: &str = "An error occurred";

/// Status-derived variants display the server's message verbatim.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Maximum length for error response bodies in log output
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull a human-readable message out of an error body.
    ///
    /// Looks at `detail` (a string, or a list of `{msg}` validation entries),
    /// then a top-level `message`.
    pub fn extract_message(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;

        match value.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => return Some(detail.clone()),
            Some(Value::Array(entries)) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|e| e.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join("; "));
                }
            }
            _ => {}
        }

        value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body).unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            500..=599 => ApiError::ServerError(message),
            code => ApiError::Rejected {
                status: code,
                message,
            },
        }
    }

    /// HTTP status when the error came from a server response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::NotFound(_) => Some(404),
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_detail_string_is_verbatim() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail":"Username already registered"}"#,
        );
        assert_eq!(err.to_string(), "Username already registered");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_validation_list_is_flattened() {
        let body = r#"{"detail":[
            {"loc":["body","operand2"],"msg":"Value error, Cannot divide by zero","type":"value_error"},
            {"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error"}
        ]}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            err.to_string(),
            "Value error, Cannot divide by zero; value is not a valid email address"
        );
    }

    #[test]
    fn test_message_field_fallback() {
        assert_eq!(
            ApiError::extract_message(r#"{"message":"Nope"}"#).as_deref(),
            Some("Nope")
        );
    }

    #[test]
    fn test_generic_fallback_for_unreadable_body() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, ApiError::ServerError(_)));
        assert_eq!(err.to_string(), FALLBACK_MESSAGE);

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail":""}"#);
        assert_eq!(err.to_string(), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_status_mapping() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "{}").is_unauthorized());
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, r#"{"detail":"Calculation not found"}"#),
            ApiError::NotFound(ref m) if m == "Calculation not found"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "{}"),
            ApiError::Rejected { status: 409, .. }
        ));
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }
}
