//! UseCase: 既読化（read-receipt reconciliation）
//!
//! 既読は `readBy += userId` の集合の和で、何度適用しても結果は変わらない。
//! 他の接続へはメッセージ全体ではなく軽量なシグナル（チャット ID・既読者・メッセージ ID）を送る。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, EventNotifier, MessageRepository, NotifyTarget, OutboundEvent, ReadFilter,
    ReadReceipt, RoomId, UserId,
};

use super::error::MarkReadError;

pub struct MarkReadUseCase {
    messages: Arc<dyn MessageRepository>,
    notifier: Arc<dyn EventNotifier>,
}

impl MarkReadUseCase {
    pub fn new(messages: Arc<dyn MessageRepository>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { messages, notifier }
    }

    /// 既読化を実行
    ///
    /// # Arguments
    ///
    /// * `reader` - 既読にするユーザー
    /// * `origin` - 要求元の接続（シグナルの配信先から除外する）。HTTP からの場合は `None`
    /// * `receipt` - 対象（メッセージ ID が指定されていればそのメッセージのみ）
    ///
    /// # Returns
    ///
    /// 新たに既読になったメッセージの件数
    pub async fn execute(
        &self,
        reader: Option<&UserId>,
        origin: Option<&ConnectionId>,
        receipt: ReadReceipt,
    ) -> Result<usize, MarkReadError> {
        let reader = reader.ok_or(MarkReadError::NotAuthenticated)?;

        // メッセージ ID が指定されていれば、所属チャットはストアの値を正とする
        let (filter, chat_id) = match (receipt.message_id.clone(), receipt.chat_id) {
            (Some(message_id), _) => {
                let message = self
                    .messages
                    .find_by_id(&message_id)
                    .await?
                    .ok_or_else(|| MarkReadError::MessageNotFound(message_id.to_string()))?;
                (ReadFilter::Message(message_id), message.chat_id)
            }
            (None, Some(chat_id)) => (ReadFilter::Chat(chat_id.clone()), chat_id),
            (None, None) => return Err(MarkReadError::TargetRequired),
        };

        let updated = self
            .messages
            .mark_read(filter, reader)
            .await
            .map_err(|e| {
                tracing::error!(
                    chat_id = %chat_id,
                    user_id = %reader,
                    "failed to mark messages as read: {}",
                    e
                );
                MarkReadError::Persistence(e)
            })?;

        let room = RoomId::from(&chat_id);
        let target = match origin {
            Some(origin) => NotifyTarget::RoomExcept {
                room,
                except: origin.clone(),
            },
            None => NotifyTarget::Room(room),
        };
        self.notifier.notify(
            target,
            &OutboundEvent::MessagesRead {
                chat_id,
                by: reader.clone(),
                message_id: receipt.message_id,
            },
        );
        Ok(updated)
    }
}
