//! 識別子の生成

use uuid::Uuid;

use super::value_object::{ChatId, ConnectionId, MessageId};

/// UUID v4 を使った識別子ファクトリ
pub struct IdFactory;

impl IdFactory {
    pub fn connection_id() -> ConnectionId {
        ConnectionId::from_uuid(Uuid::new_v4())
    }

    pub fn chat_id() -> ChatId {
        ChatId::from_uuid(Uuid::new_v4())
    }

    pub fn message_id() -> MessageId {
        MessageId::from_uuid(Uuid::new_v4())
    }
}
