// HTTP-facing errors and their JSON bodies

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Process not found")]
    NotFound,
    #[error("Access denied")]
    Forbidden,
    #[error("Failed to terminate")]
    KillFailed(String),
    #[error("Invalid pid")]
    InvalidPid,
    #[error("Failed to collect stats")]
    Collect(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidPid => StatusCode::BAD_REQUEST,
            ApiError::KillFailed(_) | ApiError::Collect(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::KillFailed(detail) => serde_json::json!({
                "error": self.to_string(),
                "detail": detail,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn kill_failure_carries_detail() {
        let (status, json) = body_json(ApiError::KillFailed("Operation not permitted".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json,
            serde_json::json!({ "error": "Failed to terminate", "detail": "Operation not permitted" })
        );
    }

    #[tokio::test]
    async fn not_found_and_forbidden_have_distinct_codes() {
        let (status, json) = body_json(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, serde_json::json!({ "error": "Process not found" }));

        let (status, json) = body_json(ApiError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json, serde_json::json!({ "error": "Access denied" }));
    }
}
