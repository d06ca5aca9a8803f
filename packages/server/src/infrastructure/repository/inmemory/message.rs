//! InMemory Message Repository 実装
//!
//! メッセージは作成順に Vec へ格納する。並び替えは作成日時で行い、
//! 同時刻のメッセージは作成順を保つ（安定ソート）。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatId, Message, MessageId, MessageRepository, Page, ReadFilter, RepositoryError, SortOrder,
    UserId,
};

/// インメモリ Message Repository 実装
#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut messages = self.messages.lock().await;
        if messages.iter().any(|m| m.id == message.id) {
            return Err(RepositoryError::Conflict(format!(
                "message '{}' already exists",
                message.id
            )));
        }
        messages.push(message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(messages.iter().find(|m| &m.id == id).cloned())
    }

    async fn find_by_chat(
        &self,
        chat_id: &ChatId,
        page: Page,
        order: SortOrder,
    ) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        let mut found: Vec<Message> = messages
            .iter()
            .filter(|m| &m.chat_id == chat_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.created_at);
        if order == SortOrder::Desc {
            found.reverse();
        }
        Ok(found
            .into_iter()
            .skip(page.offset())
            .take(page.limit)
            .collect())
    }

    async fn find_latest(&self, chat_id: &ChatId) -> Result<Option<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        // max_by_key は同値の場合に最後の要素を返すので、同時刻なら後に作られた方になる
        Ok(messages
            .iter()
            .filter(|m| &m.chat_id == chat_id)
            .max_by_key(|m| m.created_at)
            .cloned())
    }

    async fn mark_read(
        &self,
        filter: ReadFilter,
        user_id: &UserId,
    ) -> Result<usize, RepositoryError> {
        let mut messages = self.messages.lock().await;
        let updated = messages
            .iter_mut()
            .filter(|m| match &filter {
                ReadFilter::Message(id) => &m.id == id,
                ReadFilter::Chat(chat_id) => &m.chat_id == chat_id,
            })
            .map(|m| m.mark_read_by(user_id))
            .filter(|newly_read| *newly_read)
            .count();
        Ok(updated)
    }

    async fn delete(&self, id: &MessageId) -> Result<bool, RepositoryError> {
        let mut messages = self.messages.lock().await;
        let before = messages.len();
        messages.retain(|m| &m.id != id);
        Ok(messages.len() < before)
    }

    async fn delete_by_chat(&self, chat_id: &ChatId) -> Result<usize, RepositoryError> {
        let mut messages = self.messages.lock().await;
        let before = messages.len();
        messages.retain(|m| &m.chat_id != chat_id);
        Ok(before - messages.len())
    }
}
