use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Message returned to callers for any failure that is not a validation error.
pub const PREDICTION_FAILED_MESSAGE: &str = "Failed to process prediction request";

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// A required survey field is absent or null.
    MissingField(String),
    /// Unexpected failure while processing a request. The cause is logged, never returned.
    Internal(String),
    /// Error talking to a remote instance of the API.
    ExternalApi(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }

    /// Message exposed to the caller in the `error` field of the response body.
    pub fn public_message(&self) -> String {
        match self {
            AppError::MissingField(field) => format!("Missing required field: {}", field),
            AppError::Internal(_) => PREDICTION_FAILED_MESSAGE.to_string(),
            AppError::ExternalApi(_) => "External service error".to_string(),
            AppError::WithContext { source, .. } => source.public_message(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingField(field) => write!(f, "Missing required field: {}", field),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ExternalApi(msg) => write!(f, "External API error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each variant to its status code and a `{ success: false, error }` body.
    fn into_response(self) -> Response {
        match &self {
            AppError::MissingField(field) => {
                tracing::warn!("Rejected survey: missing required field '{}'", field);
            }
            AppError::Internal(msg) => {
                tracing::error!("Prediction error: {}", msg);
            }
            AppError::ExternalApi(msg) => {
                tracing::error!("External API error: {}", msg);
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
            }
        }

        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("Invalid survey payload: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApi(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

/// Extension for reqwest::Error to add context
impl<T> ResultExt<T> for Result<T, reqwest::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::from(e)),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::from(e)),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_maps_to_bad_request() {
        let err = AppError::MissingField("country".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Missing required field: country");
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let err = AppError::Internal("expected f64 at line 1".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), PREDICTION_FAILED_MESSAGE);
    }

    #[test]
    fn test_context_keeps_source_status() {
        let err = AppError::WithContext {
            source: Box::new(AppError::MissingField("owner_age".to_string())),
            context: "validating survey".to_string(),
        };

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Missing required field: owner_age");
        assert_eq!(
            err.to_string(),
            "validating survey: Missing required field: owner_age"
        );
    }
}
