//! UseCase: 所属チャット一覧の取得

use std::sync::Arc;

use crate::domain::{ChatRepository, ChatView, Page, UserId, UserRepository};

use super::{error::ChatError, view::chat_views};

pub struct FetchChatsUseCase {
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
}

impl FetchChatsUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { chats, users }
    }

    /// 更新日時の降順
    pub async fn execute(&self, user_id: &UserId, page: Page) -> Result<Vec<ChatView>, ChatError> {
        let chats = self.chats.find_for_member(user_id, page).await?;
        Ok(chat_views(self.users.as_ref(), chats).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageId, Timestamp},
        infrastructure::repository::{InMemoryChatRepository, InMemoryUserRepository},
        usecase::test_support::{chat_id, direct_chat, group_chat, user},
    };

    #[tokio::test]
    async fn test_chats_are_listed_by_recent_activity() {
        // テスト項目: 最近メッセージのあったチャットが先頭に来て、非所属のチャットは含まれない
        // given (前提条件):
        let chats = Arc::new(InMemoryChatRepository::new());
        chats.create(direct_chat("C1", "u1", "u2")).await.unwrap();
        chats
            .create(group_chat("G1", "u1", &["u3"]))
            .await
            .unwrap();
        chats.create(direct_chat("C2", "u2", "u3")).await.unwrap();
        chats
            .set_latest_message(
                &chat_id("C1"),
                Some(MessageId::new("M1").unwrap()),
                Timestamp::new(500),
            )
            .await
            .unwrap();
        let usecase = FetchChatsUseCase::new(chats, Arc::new(InMemoryUserRepository::new()));

        // when (操作):
        let views = usecase.execute(&user("u1"), Page::default()).await.unwrap();

        // then (期待する結果):
        let ids: Vec<_> = views.iter().map(|v| v.chat.id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "G1"]);
        assert_eq!(views[0].members[1].name, "u2");
    }
}
