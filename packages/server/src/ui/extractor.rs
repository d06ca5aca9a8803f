//! 認証済みユーザーの extractor

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::domain::{AuthError, UserId};

use super::{error::ApiError, state::AppState};

/// `Authorization: Bearer <token>` を検証した結果のユーザー
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized(AuthError::Missing))?;

        let user_id = state.verifier.verify(header)?;
        Ok(AuthUser(user_id))
    }
}

/// WebSocket ハンドシェイクの認証情報（`Authorization` ヘッダー）を取り出す
pub fn bearer_credential(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
