use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use storefront_core::shop::{shop_error_to_status_code, ShopError};
use storefront_core::storage::{repository_error_to_status_code, RepositoryError};

/// Handler error wrapping `anyhow::Error`.
///
/// Known domain errors pick the status code; server-side failures are logged
/// and answered with a generic message.
pub struct AppError(pub anyhow::Error);

/// JSON body extractor whose rejections are answered like any other
/// [`AppError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl AppError {
    fn status_code(&self) -> StatusCode {
        if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            return rejection.status();
        }

        let code = if let Some(shop_error) = self.0.downcast_ref::<ShopError>() {
            shop_error_to_status_code(shop_error)
        } else if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_to_status_code(repo_error)
        } else {
            500
        };

        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code.is_server_error() {
            tracing::error!(error = %self.0, status = %status_code, "Request failed");
            "Server error".to_string()
        } else {
            self.0.to_string()
        };

        (status_code, Json(json!({ "message": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(error: impl Into<anyhow::Error>) -> (StatusCode, serde_json::Value) {
        let response = AppError::from(error).into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request_with_message() {
        let (status, body) = render(ShopError::validation("quantity is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "quantity is required"}));
    }

    #[tokio::test]
    async fn test_not_found_error() {
        let (status, body) = render(ShopError::ReviewNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Review not found"}));
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let (status, body) = render(RepositoryError::Io("/var/data: permission denied".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Server error"}));

        let (status, _) = render(RepositoryError::BackendUnavailable).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = render(anyhow::anyhow!("boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Server error"}));
    }

    #[tokio::test]
    async fn test_invalid_data_is_bad_request() {
        let (status, body) = render(RepositoryError::InvalidData("unknown table: x".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Invalid data: unknown table: x"}));
    }
}
