//! WebSocket フレームの DTO
//!
//! - クライアント → サーバー: `{"event": <name>, "data": <payload>, "ack": <id>?}`
//! - サーバー → クライアント: `{"event": <name>, "data": <payload>}`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::MessageKind;

/// 受信フレーム
///
/// `data` はイベント名が分かってからペイロード型にデコードする。
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub ack: Option<u64>,
}

/// 受信フレームのデコードエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(String),
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
    #[error("invalid payload for '{event}': {reason}")]
    InvalidPayload { event: String, reason: String },
}

impl FrameError {
    pub fn code(&self) -> &'static str {
        match self {
            FrameError::UnknownEvent(_) => "unknown_event",
            FrameError::Malformed(_) | FrameError::InvalidPayload { .. } => "invalid_payload",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDto {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// `send_message` のペイロード（HTTP の `POST /api/message` と共通）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub message_type: Option<MessageKind>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub media: Option<MediaDto>,
    #[serde(default)]
    pub audio_duration: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub is_typing: bool,
}

/// `mark_read` のペイロード（HTTP の `PUT /api/message/read` と共通）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadPayload {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessagePayload {
    #[serde(default)]
    pub message_id: Option<String>,
}

/// `join_room` / `leave_room` のペイロード
///
/// Room ID の文字列そのもの、または `{"roomId": ...}` / `{"chatId": ...}` を受け付ける。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoomPayload {
    Id(String),
    Object {
        #[serde(default, rename = "roomId", alias = "chatId")]
        room_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

/// クライアントへ送るメッセージオブジェクト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub chat: String,
    pub sender: UserDto,
    pub receiver: String,
    pub content: Option<String>,
    pub message_type: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_duration: Option<f64>,
    pub read_by: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

/// クライアントへ送るチャットオブジェクト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDto {
    pub id: String,
    pub is_group: bool,
    pub group_name: Option<String>,
    pub group_avatar: Option<String>,
    pub admins: Vec<UserDto>,
    pub all_users: Vec<UserDto>,
    pub latest_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeletedDto {
    pub message_id: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesReadDto {
    pub chat_id: String,
    pub by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingDto {
    pub chat_id: String,
    pub user_id: Option<String>,
    pub is_typing: bool,
}

/// 要求元への応答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckDto {
    pub id: u64,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 送信フレーム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "message")]
    Message(MessageDto),
    #[serde(rename = "message_deleted")]
    MessageDeleted(MessageDeletedDto),
    #[serde(rename = "messages_read")]
    MessagesRead(MessagesReadDto),
    #[serde(rename = "typing")]
    Typing(TypingDto),
    #[serde(rename = "getOnlineUsers")]
    OnlineUsers(Vec<String>),
    #[serde(rename = "group_created")]
    GroupCreated(ChatDto),
    #[serde(rename = "ack")]
    Ack(AckDto),
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
