//! Health check endpoint backed by a live database probe.
//!
//! Unlike a bare liveness probe, this endpoint answers whether the service's
//! one dependency - the database - would accept a connection right now.
//! Orchestrators and load balancers poll it to decide whether the backing
//! application is serviceable.

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use tracing::instrument;

use crate::db;
use crate::error::AppError;
use crate::middleware::RequestId;
use crate::state::AppState;

/// JSON body returned by the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: &'static str,
    /// Underlying failure message, present only when unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: "unhealthy",
            error: Some(error.into()),
        }
    }
}

/// Health check handler.
///
/// Returns 200 with `{"status":"healthy"}` when the database accepts a
/// connection. Any failure along the way - unreadable password file,
/// refused connection, timeout - surfaces as 503 with the message in the
/// body, via the `AppError` response mapping.
#[instrument(name = "health::check", skip_all, fields(request_id = %request_id.0))]
pub async fn health(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<HealthResponse>, AppError> {
    db::probe(&state.config.database).await?;
    Ok(Json(HealthResponse::healthy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::routes::create_router;

    fn state_with_database(password_file: PathBuf) -> AppState {
        let mut config = AppConfig::default();
        config.database.host = "127.0.0.1".to_string();
        // Nothing listens on port 1; the probe fails fast.
        config.database.port = 1;
        config.database.database = "app".to_string();
        config.database.user = "probe".to_string();
        config.database.password_file = password_file;
        config.database.connect_timeout_seconds = 2;
        AppState::new(config)
    }

    async fn get_health(state: AppState) -> axum::response::Response {
        create_router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn unreachable_database_returns_503_unhealthy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s3cret").unwrap();

        let response = get_health(state_with_database(file.path().to_path_buf())).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert!(!json["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_password_file_returns_503_with_message() {
        let response =
            get_health(state_with_database(PathBuf::from("/nonexistent/db-password"))).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("/nonexistent/db-password"));
    }

    #[tokio::test]
    async fn health_responses_are_never_cached() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s3cret").unwrap();

        let response = get_health(state_with_database(file.path().to_path_buf())).await;

        assert_eq!(response.headers()[http::header::CACHE_CONTROL], "no-store");
    }

    #[test]
    fn healthy_body_omits_error_field() {
        let json = serde_json::to_value(HealthResponse::healthy()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "healthy" }));
    }

    #[test]
    fn unhealthy_body_carries_the_message() {
        let json = serde_json::to_value(HealthResponse::unhealthy("connection refused")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "unhealthy", "error": "connection refused" })
        );
    }
}
