//! UseCase 層のエラー型
//!
//! `code()` はクライアントへの ack やレスポンスに載せる機械可読なエラーコード。

use thiserror::Error;

use crate::domain::{ChatRuleError, RepositoryError};

pub const CODE_NOT_AUTHENTICATED: &str = "not_authenticated";
pub const CODE_SERVER_ERROR: &str = "server_error";
pub const CODE_NOT_ALLOWED: &str = "not_allowed";

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("sender is not authenticated")]
    NotAuthenticated,
    #[error("chatId is required")]
    ChatIdRequired,
    #[error("content is required for text messages")]
    ContentRequired,
    #[error("chat '{0}' not found")]
    ChatNotFound(String),
    #[error("user '{user}' is not a member of chat '{chat}'")]
    NotMember { user: String, chat: String },
    #[error("failed to persist message: {0}")]
    Persistence(#[from] RepositoryError),
}

impl SendMessageError {
    pub fn code(&self) -> &'static str {
        match self {
            SendMessageError::NotAuthenticated => CODE_NOT_AUTHENTICATED,
            SendMessageError::ChatIdRequired => "chatId required",
            SendMessageError::ContentRequired => "content required",
            SendMessageError::ChatNotFound(_) => "chat_not_found",
            SendMessageError::NotMember { .. } => CODE_NOT_ALLOWED,
            SendMessageError::Persistence(_) => CODE_SERVER_ERROR,
        }
    }
}

/// 既読化のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkReadError {
    #[error("reader is not authenticated")]
    NotAuthenticated,
    #[error("chatId or messageId is required")]
    TargetRequired,
    #[error("message '{0}' not found")]
    MessageNotFound(String),
    #[error("failed to update read state: {0}")]
    Persistence(#[from] RepositoryError),
}

impl MarkReadError {
    pub fn code(&self) -> &'static str {
        match self {
            MarkReadError::NotAuthenticated => CODE_NOT_AUTHENTICATED,
            MarkReadError::TargetRequired => "chatId or messageId required",
            MarkReadError::MessageNotFound(_) => "message_not_found",
            MarkReadError::Persistence(_) => CODE_SERVER_ERROR,
        }
    }
}

/// メッセージ削除のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteMessageError {
    #[error("requester is not authenticated")]
    NotAuthenticated,
    #[error("messageId is required")]
    MessageIdRequired,
    #[error("message '{0}' not found")]
    MessageNotFound(String),
    #[error("only the sender can delete message '{0}'")]
    NotSender(String),
    #[error("failed to delete message: {0}")]
    Persistence(#[from] RepositoryError),
}

impl DeleteMessageError {
    pub fn code(&self) -> &'static str {
        match self {
            DeleteMessageError::NotAuthenticated => CODE_NOT_AUTHENTICATED,
            DeleteMessageError::MessageIdRequired => "messageId required",
            DeleteMessageError::MessageNotFound(_) => "message_not_found",
            DeleteMessageError::NotSender(_) => CODE_NOT_ALLOWED,
            DeleteMessageError::Persistence(_) => CODE_SERVER_ERROR,
        }
    }
}

/// チャット操作（1:1 チャットの取得・グループ管理・履歴取得）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("chat '{0}' not found")]
    ChatNotFound(String),
    #[error("{0}")]
    NotAllowed(String),
    #[error(transparent)]
    Rule(#[from] ChatRuleError),
    #[error("store operation failed: {0}")]
    Persistence(#[from] RepositoryError),
}

impl ChatError {
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::InvalidInput(_) | ChatError::Rule(_) => "invalid_input",
            ChatError::ChatNotFound(_) => "chat_not_found",
            ChatError::NotAllowed(_) => CODE_NOT_ALLOWED,
            ChatError::Persistence(_) => CODE_SERVER_ERROR,
        }
    }
}
