//! DTO とドメインモデルの変換

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{
    Ack, ChatId, ChatKind, ChatView, DeleteRequest, InboundEvent, MediaRef, MessageId, MessageView,
    OutboundEvent, ReadReceipt, RoomId, SendMessageIntent, TypingSignal, UserId, UserProfile,
};
use crate::infrastructure::dto::websocket::{self as dto, FrameError};
use hanashi_shared::time::timestamp_to_rfc3339;

// ========================================
// DTO → Domain
// ========================================

/// 空文字列の識別子は「指定なし」とみなす
fn optional_id<T: TryFrom<String>>(value: Option<String>) -> Option<T> {
    value.and_then(|v| T::try_from(v).ok())
}

fn decode<T: DeserializeOwned + Default>(event: &str, data: Value) -> Result<T, FrameError> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|e| FrameError::InvalidPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })
}

fn decode_room(event: &str, data: Value) -> Result<Option<RoomId>, FrameError> {
    if data.is_null() {
        return Ok(None);
    }
    let payload: dto::RoomPayload =
        serde_json::from_value(data).map_err(|e| FrameError::InvalidPayload {
            event: event.to_string(),
            reason: e.to_string(),
        })?;
    let raw = match payload {
        dto::RoomPayload::Id(id) => Some(id),
        dto::RoomPayload::Object { room_id } => room_id,
    };
    Ok(optional_id(raw))
}

impl TryFrom<dto::ClientFrame> for InboundEvent {
    type Error = FrameError;

    fn try_from(frame: dto::ClientFrame) -> Result<Self, Self::Error> {
        let event = frame.event.as_str();
        match event {
            "join_room" => Ok(InboundEvent::JoinRoom(decode_room(event, frame.data)?)),
            "leave_room" => Ok(InboundEvent::LeaveRoom(decode_room(event, frame.data)?)),
            "send_message" => {
                let payload: dto::SendMessagePayload = decode(event, frame.data)?;
                Ok(InboundEvent::SendMessage(payload.into()))
            }
            "typing" => {
                let payload: dto::TypingPayload = decode(event, frame.data)?;
                Ok(InboundEvent::Typing(TypingSignal {
                    chat_id: optional_id(payload.chat_id),
                    is_typing: payload.is_typing,
                }))
            }
            "mark_read" => {
                let payload: dto::MarkReadPayload = decode(event, frame.data)?;
                Ok(InboundEvent::MarkRead(payload.into()))
            }
            "delete_message" => {
                let payload: dto::DeleteMessagePayload = decode(event, frame.data)?;
                Ok(InboundEvent::DeleteMessage(DeleteRequest {
                    message_id: optional_id(payload.message_id),
                }))
            }
            other => Err(FrameError::UnknownEvent(other.to_string())),
        }
    }
}

impl From<dto::SendMessagePayload> for SendMessageIntent {
    fn from(payload: dto::SendMessagePayload) -> Self {
        Self {
            chat_id: optional_id(payload.chat_id),
            content: payload.content,
            kind: payload.message_type.unwrap_or_default(),
            media: payload.media.map(MediaRef::from),
            audio_duration: payload.audio_duration,
            client_id: payload.client_id.filter(|id| !id.is_empty()),
            receiver: optional_id(payload.receiver),
        }
    }
}

impl From<dto::MarkReadPayload> for ReadReceipt {
    fn from(payload: dto::MarkReadPayload) -> Self {
        Self {
            chat_id: optional_id::<ChatId>(payload.chat_id),
            message_id: optional_id::<MessageId>(payload.message_id),
        }
    }
}

impl From<dto::MediaDto> for MediaRef {
    fn from(media: dto::MediaDto) -> Self {
        Self {
            url: media.url,
            public_id: media.public_id,
            format: media.format,
            size: media.size,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&MediaRef> for dto::MediaDto {
    fn from(media: &MediaRef) -> Self {
        Self {
            url: media.url.clone(),
            public_id: media.public_id.clone(),
            format: media.format.clone(),
            size: media.size,
        }
    }
}

impl From<&UserProfile> for dto::UserDto {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.to_string(),
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
        }
    }
}

impl From<&MessageView> for dto::MessageDto {
    fn from(view: &MessageView) -> Self {
        let message = &view.message;
        Self {
            id: message.id.to_string(),
            chat: message.chat_id.to_string(),
            sender: (&view.sender).into(),
            receiver: message.receiver.to_string(),
            content: message.content.as_ref().map(|c| c.as_str().to_string()),
            message_type: message.kind,
            media: message.media.as_ref().map(dto::MediaDto::from),
            audio_duration: message.audio_duration,
            read_by: message.read_by.iter().map(UserId::to_string).collect(),
            created_at: timestamp_to_rfc3339(message.created_at.value()),
            updated_at: timestamp_to_rfc3339(message.updated_at.value()),
            client_id: view.client_id.clone(),
        }
    }
}

impl From<&ChatView> for dto::ChatDto {
    fn from(view: &ChatView) -> Self {
        let chat = &view.chat;
        let (group_name, group_avatar) = match &chat.kind {
            ChatKind::Direct => (None, None),
            ChatKind::Group { name, avatar } => (Some(name.clone()), Some(avatar.clone())),
        };
        Self {
            id: chat.id.to_string(),
            is_group: chat.is_group(),
            group_name,
            group_avatar,
            admins: view
                .admin_profiles()
                .iter()
                .map(dto::UserDto::from)
                .collect(),
            all_users: view.members.iter().map(dto::UserDto::from).collect(),
            latest_message: chat.latest_message.as_ref().map(MessageId::to_string),
            created_at: timestamp_to_rfc3339(chat.created_at.value()),
            updated_at: timestamp_to_rfc3339(chat.updated_at.value()),
        }
    }
}

impl From<&OutboundEvent> for dto::ServerEvent {
    fn from(event: &OutboundEvent) -> Self {
        match event {
            OutboundEvent::Message(view) => dto::ServerEvent::Message(view.as_ref().into()),
            OutboundEvent::MessageDeleted {
                message_id,
                chat_id,
            } => dto::ServerEvent::MessageDeleted(dto::MessageDeletedDto {
                message_id: message_id.to_string(),
                chat_id: chat_id.to_string(),
            }),
            OutboundEvent::MessagesRead {
                chat_id,
                by,
                message_id,
            } => dto::ServerEvent::MessagesRead(dto::MessagesReadDto {
                chat_id: chat_id.to_string(),
                by: by.to_string(),
                message_id: message_id.as_ref().map(MessageId::to_string),
            }),
            OutboundEvent::Typing {
                chat_id,
                user_id,
                is_typing,
            } => dto::ServerEvent::Typing(dto::TypingDto {
                chat_id: chat_id.to_string(),
                user_id: user_id.as_ref().map(UserId::to_string),
                is_typing: *is_typing,
            }),
            OutboundEvent::OnlineUsers(users) => {
                dto::ServerEvent::OnlineUsers(users.iter().map(UserId::to_string).collect())
            }
            OutboundEvent::GroupCreated(view) => {
                dto::ServerEvent::GroupCreated(view.as_ref().into())
            }
        }
    }
}

impl dto::AckDto {
    pub fn from_ack(id: u64, ack: &Ack) -> Self {
        let mut dto = Self {
            id,
            ok: ack.is_ok(),
            message_id: None,
            client_id: None,
            error: None,
        };
        match ack {
            Ack::Sent {
                message_id,
                client_id,
            } => {
                dto.message_id = Some(message_id.to_string());
                dto.client_id = client_id.clone();
            }
            Ack::Done => {}
            Ack::Rejected(code) => dto.error = Some(code.to_string()),
        }
        dto
    }
}
