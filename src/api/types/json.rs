//! JSON body extractor whose rejections use the gateway error envelope

use axum::{
    extract::{rejection::JsonRejection as AxumRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::{ApiError, ApiErrorType};

/// `axum::Json` replacement for request bodies and responses
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

/// Body that could not be read or deserialized
#[derive(Debug)]
pub struct JsonRejection {
    status: StatusCode,
    message: String,
}

impl IntoResponse for JsonRejection {
    fn into_response(self) -> Response {
        ApiError::new(self.status, ApiErrorType::InvalidRequestError, self.message)
            .with_code("invalid_json")
            .into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumJson::<T>::from_request(req, state)
            .await
            .map(|AxumJson(value)| Json(value))
            .map_err(|rejection| JsonRejection {
                status: rejection.status(),
                message: describe(&rejection),
            })
    }
}

fn describe(rejection: &AxumRejection) -> String {
    match rejection {
        AxumRejection::JsonDataError(e) => format!("Invalid JSON data: {}", e.body_text()),
        AxumRejection::JsonSyntaxError(e) => format!("Invalid JSON syntax: {}", e.body_text()),
        AxumRejection::MissingJsonContentType(_) => {
            "Expected a 'Content-Type: application/json' header".to_string()
        }
        AxumRejection::BytesRejection(e) => format!("Failed to read body: {}", e.body_text()),
        _ => "Invalid JSON request".to_string(),
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};

    #[derive(Debug, serde::Deserialize)]
    struct TierRequest {
        tier: String,
    }

    fn request(body: &str, content_type: Option<&str>) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_extracts() {
        let Json(parsed) = Json::<TierRequest>::from_request(
            request(r#"{"tier":"premium"}"#, Some("application/json")),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(parsed.tier, "premium");
    }

    #[tokio::test]
    async fn test_missing_field_is_json_error() {
        let rejection = Json::<TierRequest>::from_request(
            request(r#"{"level":"premium"}"#, Some("application/json")),
            &(),
        )
        .await
        .unwrap_err();

        assert_eq!(rejection.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(rejection.message.starts_with("Invalid JSON data"));
    }

    #[tokio::test]
    async fn test_rejection_uses_error_envelope() {
        let rejection =
            Json::<TierRequest>::from_request(request(r#"{"tier":"free"}"#, None), &())
                .await
                .unwrap_err();

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(body["error"]["code"], "invalid_json");
    }
}
