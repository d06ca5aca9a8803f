//! InMemory Chat Repository 実装
//!
//! ドメイン層が定義する ChatRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! 1:1 チャットの一意性は DB 制約ではなく、UseCase 側の「検索してから作成」で担保している。
//! そのため `create` 自体は同じ組み合わせの 1:1 チャットの重複を拒否しない。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Chat, ChatId, ChatRepository, MessageId, Page, RepositoryError, Timestamp, UserId,
};

/// インメモリ Chat Repository 実装
#[derive(Default)]
pub struct InMemoryChatRepository {
    chats: Mutex<HashMap<ChatId, Chat>>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn find_by_id(&self, id: &ChatId) -> Result<Option<Chat>, RepositoryError> {
        let chats = self.chats.lock().await;
        Ok(chats.get(id).cloned())
    }

    async fn find_direct(&self, a: &UserId, b: &UserId) -> Result<Option<Chat>, RepositoryError> {
        let chats = self.chats.lock().await;
        // 重複が存在する場合は最も古いものを返す
        Ok(chats
            .values()
            .filter(|chat| chat.is_direct_between(a, b))
            .min_by(|x, y| {
                x.created_at
                    .cmp(&y.created_at)
                    .then_with(|| x.id.cmp(&y.id))
            })
            .cloned())
    }

    async fn find_for_member(
        &self,
        user_id: &UserId,
        page: Page,
    ) -> Result<Vec<Chat>, RepositoryError> {
        let chats = self.chats.lock().await;
        let mut found: Vec<Chat> = chats
            .values()
            .filter(|chat| chat.is_member(user_id))
            .cloned()
            .collect();
        found.sort_by(|x, y| {
            y.updated_at
                .cmp(&x.updated_at)
                .then_with(|| x.id.cmp(&y.id))
        });
        Ok(found
            .into_iter()
            .skip(page.offset())
            .take(page.limit)
            .collect())
    }

    async fn create(&self, chat: Chat) -> Result<Chat, RepositoryError> {
        let mut chats = self.chats.lock().await;
        if chats.contains_key(&chat.id) {
            return Err(RepositoryError::Conflict(format!(
                "chat '{}' already exists",
                chat.id
            )));
        }
        chats.insert(chat.id.clone(), chat.clone());
        Ok(chat)
    }

    async fn update(&self, chat: Chat) -> Result<Chat, RepositoryError> {
        let mut chats = self.chats.lock().await;
        match chats.get_mut(&chat.id) {
            Some(stored) => {
                *stored = chat.clone();
                Ok(chat)
            }
            None => Err(RepositoryError::Conflict(format!(
                "chat '{}' does not exist",
                chat.id
            ))),
        }
    }

    async fn set_latest_message(
        &self,
        id: &ChatId,
        message_id: Option<MessageId>,
        now: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut chats = self.chats.lock().await;
        let chat = chats
            .get_mut(id)
            .ok_or_else(|| RepositoryError::Conflict(format!("chat '{id}' does not exist")))?;
        chat.latest_message = message_id;
        chat.updated_at = now;
        Ok(())
    }

    async fn delete(&self, id: &ChatId) -> Result<bool, RepositoryError> {
        let mut chats = self.chats.lock().await;
        Ok(chats.remove(id).is_some())
    }
}
