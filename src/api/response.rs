//! JSON envelope shared by every endpoint, and the single place where
//! application errors become HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::AppError;

/// `{ success, message?, data?, error? }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: Option<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message,
            data,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error,
        }
    }
}

pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);
pub type ApiResult<T> = Result<Reply<T>, ApiError>;

/// 200 with a payload.
pub fn ok<T>(data: T) -> Reply<T> {
    (StatusCode::OK, Json(ApiResponse::success(None, Some(data))))
}

/// 201 with the newly allocated identifier(s).
pub fn created<T>(message: &str, data: T) -> Reply<T> {
    (
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(message.to_string()), Some(data))),
    )
}

/// 200 with only a confirmation message.
pub fn done(message: &str) -> Reply<()> {
    (
        StatusCode::OK,
        Json(ApiResponse::success(Some(message.to_string()), None)),
    )
}

/// HTTP face of [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::validation(format!(
            "Invalid JSON body: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self.0 {
            AppError::Validation(_) | AppError::NotFound(_) => {
                ApiResponse::<()>::failure(self.0.to_string(), None)
            }
            AppError::Ledger(e) => {
                ApiResponse::<()>::failure("Ledger operation failed", Some(e.to_string()))
            }
        };

        (status, Json(body)).into_response()
    }
}

/// `Json` extractor whose rejections use the envelope instead of axum's plain-text body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
