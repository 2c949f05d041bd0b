//! API error type and its JSON representation

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::isochrone::IsochroneError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request data (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Origin is not on the loaded road network (422)
    #[error("Origin is outside the road network")]
    OriginOutsideNetwork,

    /// Isochrone service failed (502), timed out (504) or rejected the
    /// caller's key (400)
    #[error("Isochrone service error: {0}")]
    Isochrone(#[from] IsochroneError),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::OriginOutsideNetwork => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Isochrone(IsochroneError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Self::Isochrone(IsochroneError::Rejected { .. }) => StatusCode::BAD_REQUEST,
            Self::Isochrone(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::OriginOutsideNetwork => "ORIGIN_OUTSIDE_NETWORK",
            Self::Isochrone(IsochroneError::Timeout) => "ISOCHRONE_TIMEOUT",
            Self::Isochrone(IsochroneError::Rejected { .. }) => "INVALID_API_KEY",
            Self::Isochrone(_) => "ISOCHRONE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the same request may succeed later
    pub fn retryable(&self) -> bool {
        match self {
            Self::Isochrone(err) => err.is_transient(),
            _ => false,
        }
    }
}

impl From<searchzone_core::Error> for ApiError {
    fn from(err: searchzone_core::Error) -> Self {
        use searchzone_core::Error as CoreError;
        match err {
            CoreError::NoPointsFound => Self::OriginOutsideNetwork,
            CoreError::InvalidParameter(message) | CoreError::InvalidData(message) => {
                Self::BadRequest(message)
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "API error");
        } else {
            tracing::warn!(error = %self, "API error");
        }

        let body = ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
            retryable: self.retryable(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isochrone_failures_are_retryable_gateway_errors() {
        let timeout = ApiError::from(IsochroneError::Timeout);
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert!(timeout.retryable());

        let down = ApiError::from(IsochroneError::Status {
            status: 503,
            body: String::new(),
        });
        assert_eq!(down.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(down.error_code(), "ISOCHRONE_UNAVAILABLE");
        assert!(down.retryable());

        let throttled = ApiError::from(IsochroneError::Status {
            status: 429,
            body: String::new(),
        });
        assert!(throttled.retryable());
    }

    #[test]
    fn rejected_key_is_a_client_error() {
        for status in [401, 403] {
            let err = ApiError::from(IsochroneError::Rejected { status });
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(err.error_code(), "INVALID_API_KEY");
            assert!(!err.retryable());
        }

        let bad_input = ApiError::from(IsochroneError::Status {
            status: 400,
            body: String::new(),
        });
        assert_eq!(bad_input.status_code(), StatusCode::BAD_GATEWAY);
        assert!(!bad_input.retryable());
    }

    #[test]
    fn core_errors_map_to_client_errors() {
        let err = ApiError::from(searchzone_core::Error::InvalidParameter("minutes".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.retryable());

        let err = ApiError::from(searchzone_core::Error::NoPointsFound);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
