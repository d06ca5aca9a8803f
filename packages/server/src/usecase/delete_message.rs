//! UseCase: メッセージ削除
//!
//! 送信者のみが削除できる。ストアから物理削除した後に `message_deleted` を Room へ通知する。
//! 削除したメッセージがチャットの「最新メッセージ」だった場合は、残りの最新メッセージで
//! ポインタを付け替える（best-effort）。

use std::sync::Arc;

use hanashi_shared::time::Clock;

use crate::domain::{
    ChatId, ChatRepository, DeleteRequest, EventNotifier, MessageId, MessageRepository,
    NotifyTarget, OutboundEvent, RoomId, Timestamp, UserId,
};

use super::error::DeleteMessageError;

pub struct DeleteMessageUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    notifier: Arc<dyn EventNotifier>,
    clock: Arc<dyn Clock>,
}

impl DeleteMessageUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        notifier: Arc<dyn EventNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chats,
            messages,
            notifier,
            clock,
        }
    }

    /// 削除を実行し、削除したメッセージの ID と所属チャットを返す
    pub async fn execute(
        &self,
        requester: Option<&UserId>,
        request: DeleteRequest,
    ) -> Result<(MessageId, ChatId), DeleteMessageError> {
        let requester = requester.ok_or(DeleteMessageError::NotAuthenticated)?;
        let message_id = request
            .message_id
            .ok_or(DeleteMessageError::MessageIdRequired)?;

        let message = self
            .messages
            .find_by_id(&message_id)
            .await?
            .ok_or_else(|| DeleteMessageError::MessageNotFound(message_id.to_string()))?;
        if &message.sender != requester {
            return Err(DeleteMessageError::NotSender(message_id.to_string()));
        }

        if !self.messages.delete(&message_id).await? {
            // 並行した削除に負けた
            return Err(DeleteMessageError::MessageNotFound(message_id.to_string()));
        }
        let chat_id = message.chat_id;

        self.repoint_latest(&chat_id, &message_id).await;

        self.notifier.notify(
            NotifyTarget::Room(RoomId::from(&chat_id)),
            &OutboundEvent::MessageDeleted {
                message_id: message_id.clone(),
                chat_id: chat_id.clone(),
            },
        );
        tracing::info!(chat_id = %chat_id, message_id = %message_id, "message deleted");
        Ok((message_id, chat_id))
    }

    async fn repoint_latest(&self, chat_id: &ChatId, deleted: &MessageId) {
        let chat = match self.chats.find_by_id(chat_id).await {
            Ok(Some(chat)) => chat,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(chat_id = %chat_id, "failed to load chat for latest message: {}", e);
                return;
            }
        };
        if chat.latest_message.as_ref() != Some(deleted) {
            return;
        }
        let latest = match self.messages.find_latest(chat_id).await {
            Ok(latest) => latest.map(|m| m.id),
            Err(e) => {
                tracing::warn!(chat_id = %chat_id, "failed to find latest message: {}", e);
                return;
            }
        };
        let now = Timestamp::new(self.clock.now_millis());
        if let Err(e) = self.chats.set_latest_message(chat_id, latest, now).await {
            tracing::warn!(chat_id = %chat_id, "failed to update latest message: {}", e);
        }
    }
}
