//! HTTP API のエラーレスポンス
//!
//! UseCase のエラーをステータスコードに対応付け、`{"message": ...}` の JSON で返す。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    domain::{AuthError, ValueObjectError},
    infrastructure::dto::http::ErrorBody,
    usecase::{ChatError, DeleteMessageError, MarkReadError, SendMessageError},
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("not authorized: {0}")]
    Unauthorized(#[from] AuthError),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// 内部の詳細はログにのみ出す
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", self);
        }
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(e: ValueObjectError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::InvalidInput(_) | ChatError::Rule(_) => ApiError::BadRequest(e.to_string()),
            ChatError::ChatNotFound(_) => ApiError::NotFound(e.to_string()),
            ChatError::NotAllowed(_) => ApiError::Forbidden(e.to_string()),
            ChatError::Persistence(e) => {
                tracing::error!("store operation failed: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<SendMessageError> for ApiError {
    fn from(e: SendMessageError) -> Self {
        match e {
            SendMessageError::NotAuthenticated => ApiError::Unauthorized(AuthError::Missing),
            SendMessageError::ChatIdRequired | SendMessageError::ContentRequired => {
                ApiError::BadRequest(e.to_string())
            }
            SendMessageError::ChatNotFound(_) => ApiError::NotFound(e.to_string()),
            SendMessageError::NotMember { .. } => ApiError::Forbidden(e.to_string()),
            SendMessageError::Persistence(_) => ApiError::Internal,
        }
    }
}

impl From<MarkReadError> for ApiError {
    fn from(e: MarkReadError) -> Self {
        match e {
            MarkReadError::NotAuthenticated => ApiError::Unauthorized(AuthError::Missing),
            MarkReadError::TargetRequired => ApiError::BadRequest(e.to_string()),
            MarkReadError::MessageNotFound(_) => ApiError::NotFound(e.to_string()),
            MarkReadError::Persistence(_) => ApiError::Internal,
        }
    }
}

impl From<DeleteMessageError> for ApiError {
    fn from(e: DeleteMessageError) -> Self {
        match e {
            DeleteMessageError::NotAuthenticated => ApiError::Unauthorized(AuthError::Missing),
            DeleteMessageError::MessageIdRequired => ApiError::BadRequest(e.to_string()),
            DeleteMessageError::MessageNotFound(_) => ApiError::NotFound(e.to_string()),
            DeleteMessageError::NotSender(_) => ApiError::Forbidden(e.to_string()),
            DeleteMessageError::Persistence(_) => ApiError::Internal,
        }
    }
}
