//! Application error type and its HTTP mapping.
//!
//! The probe deliberately collapses every failure mode into one outcome:
//! 503 Service Unavailable with an unhealthy JSON body carrying the
//! underlying message. The variants exist so logs can tell a missing
//! secret from an unreachable database; callers only see the one shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::routes::health::HealthResponse;
use crate::secret::SecretError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database probe timed out after {0} seconds")]
    Timeout(u64),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Probe failed");

        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::unhealthy(self.to_string())),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn any_failure_maps_to_503_unhealthy_json() {
        let err = AppError::Timeout(5);
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["error"], "Database probe timed out after 5 seconds");
    }

    #[tokio::test]
    async fn secret_errors_surface_the_path() {
        let err = AppError::Secret(SecretError {
            path: "/run/secrets/db-password".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("/run/secrets/db-password"));
    }
}
