//! UseCase: チャットの削除（メンバーのみ、メッセージも削除）

use std::sync::Arc;

use crate::domain::{ChatId, ChatRepository, MessageRepository, UserId};

use super::error::ChatError;

pub struct DeleteChatUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl DeleteChatUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { chats, messages }
    }

    pub async fn execute(&self, requester: &UserId, chat_id: &ChatId) -> Result<(), ChatError> {
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

        // メッセージを先に消す（途中で失敗してもチャットだけが残る）
        let removed = self.messages.delete_by_chat(chat_id).await?;
        self.chats.delete(chat_id).await?;
        tracing::info!(
            chat_id = %chat_id,
            requester = %requester,
            messages = removed,
            "chat deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::MessageId,
        infrastructure::repository::{InMemoryChatRepository, InMemoryMessageRepository},
        usecase::test_support::{chat_id, direct_chat, text_message, user},
    };

    #[tokio::test]
    async fn test_participant_deletes_chat_with_messages() {
        // テスト項目: メンバーはチャットを削除でき、メッセージも消える。非メンバーは拒否される
        // given (前提条件):
        let chats = Arc::new(InMemoryChatRepository::new());
        chats.create(direct_chat("C1", "u1", "u2")).await.unwrap();
        let messages = Arc::new(InMemoryMessageRepository::new());
        messages
            .create(text_message("M1", "C1", "u1", "u2", 10))
            .await
            .unwrap();
        let usecase = DeleteChatUseCase::new(chats.clone(), messages.clone());

        // when (操作):
        let outsider = usecase.execute(&user("u3"), &chat_id("C1")).await;
        let participant = usecase.execute(&user("u2"), &chat_id("C1")).await;
        let again = usecase.execute(&user("u2"), &chat_id("C1")).await;

        // then (期待する結果):
        assert_eq!(outsider.unwrap_err().code(), "not_allowed");
        assert!(participant.is_ok());
        assert_eq!(again.unwrap_err().code(), "chat_not_found");
        assert!(
            messages
                .find_by_id(&MessageId::new("M1").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }
}
