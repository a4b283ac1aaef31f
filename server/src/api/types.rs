//! Shared API types
//!
//! Error envelope used by every endpoint: `{"error", "code", "detail"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::data::DataError;
use crate::data::filters::FilterError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, detail: String },
    Internal { detail: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    /// Map a data layer error; store failures are logged and never exposed
    pub fn from_data(e: DataError) -> Self {
        match e {
            DataError::InvalidQuery(detail) => Self::bad_request("INVALID_QUERY", detail),
            e => {
                tracing::error!(error = %e, backend = e.backend(), "Data error");
                Self::internal("Database operation failed")
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(e: FilterError) -> Self {
        tracing::debug!(error = %e, code = e.code(), "Filter rejected");
        Self::bad_request(e.code(), e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, detail) = match self {
            Self::BadRequest { code, detail } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, detail)
            }
            Self::Internal { detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                detail,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "detail": detail
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_filter_error_is_bad_request() {
        let err: ApiError = FilterError::syntax("Unsupported operator: xx").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "bad_request");
        assert_eq!(body["code"], "FILTER_SYNTAX_ERROR");
        assert_eq!(body["detail"], "Unsupported operator: xx");
    }

    #[tokio::test]
    async fn test_store_error_is_masked() {
        let err = ApiError::from_data(DataError::timeout("duckdb", 30));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "INTERNAL");
        assert_eq!(body["detail"], "Database operation failed");
    }

    #[tokio::test]
    async fn test_invalid_query_is_bad_request() {
        let err = ApiError::from_data(DataError::InvalidQuery("too many buckets".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_QUERY");
    }
}
