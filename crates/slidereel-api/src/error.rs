//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` renders with the same status, body and logging.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use slidereel_core::{AppError, ErrorMetadata, LogLevel};
use slidereel_infra::ErrorResponse;
use validator::Validate;

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from slidereel-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Body deserialization failures become a 400 in the standard error shape.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that also runs `validator` rules. Both parse and
/// validation failures render as 400 with an [`ErrorResponse`] body.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        inner.validate().map_err(AppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Request failed"
            );
        }
    }
}

/// Client body for `error`. Details are only exposed for non-sensitive
/// errors outside production.
pub fn error_body(error: &AppError, is_production: bool) -> ErrorResponse {
    let body = ErrorResponse::new(error.client_message());
    if is_production || error.is_sensitive() {
        body
    } else {
        body.with_details(error.detailed_message())
    }
}

/// Client message of a rendered error, kept on the response for
/// [`hide_error_details`].
#[derive(Debug, Clone)]
struct RenderedError {
    message: String,
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let mut response = (status, Json(error_body(app_error, false))).into_response();
        response.extensions_mut().insert(RenderedError {
            message: app_error.client_message(),
        });
        response
    }
}

/// Response mapper that strips `details` from error bodies when the service
/// runs in production. The flag comes from `Config::is_production`.
pub async fn hide_error_details(State(is_production): State<bool>, response: Response) -> Response {
    if !is_production {
        return response;
    }
    let Some(rendered) = response.extensions().get::<RenderedError>().cloned() else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    (parts, Json(ErrorResponse::new(rendered.message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    async fn invalid_input_body(is_production: bool) -> serde_json::Value {
        let app = Router::new()
            .route(
                "/",
                get(|| async {
                    HttpAppError(AppError::InvalidInput(
                        "duration must be greater than 1".to_string(),
                    ))
                }),
            )
            .layer(axum::middleware::map_response_with_state(
                is_production,
                hide_error_details,
            ));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_details_follow_configured_environment() {
        let dev = invalid_input_body(false).await;
        assert_eq!(dev["error"], "duration must be greater than 1");
        assert!(dev["details"].is_string());

        let prod = invalid_input_body(true).await;
        assert_eq!(
            prod,
            serde_json::json!({ "error": "duration must be greater than 1" })
        );
    }

    #[test]
    fn test_video_creation_body_hides_cause() {
        let err = AppError::VideoCreation("encoder exited with code 1".to_string());
        let body = serde_json::to_value(error_body(&err, false)).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Failed to create video" }));
    }

    #[test]
    fn test_invalid_input_details_hidden_in_production() {
        let err = AppError::InvalidInput("duration must be greater than 1".to_string());

        let dev = error_body(&err, false);
        assert_eq!(dev.error, "duration must be greater than 1");
        assert!(dev.details.is_some());

        let prod = error_body(&err, true);
        assert!(prod.details.is_none());
    }

    #[test]
    fn test_status_codes() {
        let busy = HttpAppError(AppError::ServiceBusy("full".to_string())).into_response();
        assert_eq!(busy.status(), StatusCode::SERVICE_UNAVAILABLE);

        let internal: HttpAppError = anyhow::anyhow!("join failed").into();
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
