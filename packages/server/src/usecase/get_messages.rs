//! UseCase: チャット履歴の取得（メンバーのみ）

use std::sync::Arc;

use crate::domain::{
    ChatId, ChatRepository, MessageRepository, MessageView, Page, SortOrder, UserId, UserRepository,
};

use super::{error::ChatError, view::message_views};

pub struct GetMessagesUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
}

impl GetMessagesUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            chats,
            messages,
            users,
        }
    }

    pub async fn execute(
        &self,
        requester: &UserId,
        chat_id: &ChatId,
        page: Page,
        order: SortOrder,
    ) -> Result<Vec<MessageView>, ChatError> {
        let chat = self
            .chats
            .find_by_id(chat_id)
            .await?
            .ok_or_else(|| ChatError::ChatNotFound(chat_id.to_string()))?;
        if !chat.is_member(requester) {
            return Err(ChatError::NotAllowed(format!(
                "user '{}' is not a member of chat '{}'",
                requester, chat_id
            )));
        }
        let messages = self.messages.find_by_chat(chat_id, page, order).await?;
        Ok(message_views(self.users.as_ref(), messages).await)
    }
}
