//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクト生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),
    #[error("message content must not be empty")]
    EmptyContent,
}

/// エンティティのルール違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatRuleError {
    #[error("chat is not a group chat")]
    NotAGroup,
    #[error("user '{0}' is already a member")]
    AlreadyMember(String),
    #[error("user '{0}' is not a member")]
    NotMember(String),
}

/// 永続化ストアのエラー
///
/// 「見つからない」はエラーではなく `Ok(None)` で表現する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("write conflict: {0}")]
    Conflict(String),
}

/// 接続へのメッセージ送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),
    #[error("push failed: {0}")]
    PushFailed(String),
}

/// 認証情報の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("credential is missing")]
    Missing,
    #[error("credential has expired")]
    Expired,
    #[error("credential is invalid: {0}")]
    Invalid(String),
}

/// 接続ライフサイクルの不正な遷移
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid connection transition from {from} on {action}")]
pub struct TransitionError {
    pub from: &'static str,
    pub action: &'static str,
}
