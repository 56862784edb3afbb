//! HTTP error response handling for the API
//!
//! Domain errors become a status code plus an `{error, details}` JSON body.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArtifactError, ConversionError};
    use std::path::PathBuf;

    async fn body_of(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn conversion_failure_carries_stderr() {
        let response = Error::Conversion(ConversionError::Failed {
            exit_code: Some(2),
            stderr: "fatal: not found\n".into(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(response).await,
            ApiError::new("Error processing repository", "fatal: not found\n")
        );
    }

    #[tokio::test]
    async fn unreadable_artifact_is_send_error() {
        let response = Error::Artifact(ArtifactError::Unreadable {
            path: PathBuf::from("/tmp/x/out.txt"),
            reason: "No such file or directory (os error 2)".into(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body.error, "Error sending file");
        assert!(body.details.contains("No such file"));
    }

    #[tokio::test]
    async fn bad_request_keeps_status() {
        let response = Error::InvalidReference("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
