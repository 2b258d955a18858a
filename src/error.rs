//! Error types for the recommendation service.
//!
//! Every failure that can reach the HTTP boundary is a variant of [`Error`].
//! Handlers return `Result<_, Error>` and the [`IntoResponse`] impl renders
//! the `{"error": "<message>"}` body with a status derived from the variant.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("'{input}' is not a valid ObjectId: it must be a 24-character hex string")]
    InvalidObjectId { input: String },

    #[error("Storage error: {message}")]
    Storage {
        message: Cow<'static, str>,
        #[source]
        source: Option<sqlx::Error>,
    },

    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: Cow<'static, str> },

    #[error("Corrupt record: {message}")]
    CorruptRecord { message: Cow<'static, str> },

    #[error("Configuration error: {message}")]
    Config {
        message: Cow<'static, str>,
        #[source]
        source: Option<config::ConfigError>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn storage(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn corrupt_record(message: impl Into<Cow<'static, str>>) -> Self {
        Self::CorruptRecord {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Client mistakes map to 4xx, an unreachable backend to 503, the rest to 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidObjectId { .. } => StatusCode::BAD_REQUEST,
            Error::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Error::StorageUnavailable {
                    message: err.to_string().into(),
                }
            }
            sqlx::Error::Database(db_err) => Error::Storage {
                message: db_err.message().to_string().into(),
                source: Some(err),
            },
            _ => Error::Storage {
                message: err.to_string().into(),
                source: Some(err),
            },
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config {
            message: err.to_string().into(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            Error::InvalidObjectId {
                input: "abc".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::StorageUnavailable {
                message: "down".into()
            }
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::storage("query failed").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::corrupt_record("bad row").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sqlx_error_mapping() {
        assert!(matches!(
            Error::from(sqlx::Error::PoolTimedOut),
            Error::StorageUnavailable { .. }
        ));
        assert!(matches!(
            Error::from(sqlx::Error::RowNotFound),
            Error::Storage { .. }
        ));
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = Error::InvalidObjectId {
            input: "xyz".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("'xyz' is not a valid ObjectId"));
    }
}
