//! 受信・送信イベントのドメイン表現
//!
//! クライアントからのフレームはデコード時点でこの閉じた列挙型に変換され、
//! 単一のディスパッチャーが消費する。

use super::{
    entity::{ChatView, MessageView},
    value_object::{ChatId, MediaRef, MessageId, MessageKind, RoomId, UserId},
};

/// メッセージ送信の意図
///
/// 必須項目の検証は UseCase 側で行うため、ここでは欠落を `None` で表す。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SendMessageIntent {
    pub chat_id: Option<ChatId>,
    pub content: Option<String>,
    pub kind: MessageKind,
    pub media: Option<MediaRef>,
    pub audio_duration: Option<f64>,
    pub client_id: Option<String>,
    pub receiver: Option<UserId>,
}

/// 入力中シグナル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingSignal {
    pub chat_id: Option<ChatId>,
    pub is_typing: bool,
}

/// 既読通知
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadReceipt {
    pub chat_id: Option<ChatId>,
    pub message_id: Option<MessageId>,
}

/// メッセージ削除要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub message_id: Option<MessageId>,
}

/// クライアント → サーバーのイベント
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    JoinRoom(Option<RoomId>),
    LeaveRoom(Option<RoomId>),
    SendMessage(SendMessageIntent),
    Typing(TypingSignal),
    MarkRead(ReadReceipt),
    DeleteMessage(DeleteRequest),
}

impl InboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::JoinRoom(_) => "join_room",
            InboundEvent::LeaveRoom(_) => "leave_room",
            InboundEvent::SendMessage(_) => "send_message",
            InboundEvent::Typing(_) => "typing",
            InboundEvent::MarkRead(_) => "mark_read",
            InboundEvent::DeleteMessage(_) => "delete_message",
        }
    }
}

/// サーバー → クライアントのイベント
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// 永続化済みのメッセージ（送信者情報付き）
    Message(Box<MessageView>),
    MessageDeleted {
        message_id: MessageId,
        chat_id: ChatId,
    },
    MessagesRead {
        chat_id: ChatId,
        by: UserId,
        message_id: Option<MessageId>,
    },
    Typing {
        chat_id: ChatId,
        user_id: Option<UserId>,
        is_typing: bool,
    },
    /// オンラインユーザーのスナップショット
    OnlineUsers(Vec<UserId>),
    /// 新しいグループ（各メンバーへ直接送る）
    GroupCreated(Box<ChatView>),
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::Message(_) => "message",
            OutboundEvent::MessageDeleted { .. } => "message_deleted",
            OutboundEvent::MessagesRead { .. } => "messages_read",
            OutboundEvent::Typing { .. } => "typing",
            OutboundEvent::OnlineUsers(_) => "getOnlineUsers",
            OutboundEvent::GroupCreated(_) => "group_created",
        }
    }
}

/// 要求元への応答（ack）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// メッセージが永続化された
    Sent {
        message_id: MessageId,
        client_id: Option<String>,
    },
    /// 成功（付随データなし）
    Done,
    /// 失敗（機械可読なエラーコード）
    Rejected(&'static str),
}

impl Ack {
    pub fn is_ok(&self) -> bool {
        !matches!(self, Ack::Rejected(_))
    }
}
