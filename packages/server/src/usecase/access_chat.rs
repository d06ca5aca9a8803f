//! UseCase: 1:1 チャットの取得または作成

use std::sync::Arc;

use hanashi_shared::time::Clock;

use crate::domain::{Chat, ChatRepository, ChatView, IdFactory, Timestamp, UserId, UserRepository};

use super::{error::ChatError, view::chat_view};

pub struct AccessChatUseCase {
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl AccessChatUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chats,
            users,
            clock,
        }
    }

    /// 2 人の間の 1:1 チャットを返す。存在しなければ作成する
    ///
    /// 戻り値の `bool` は新規作成したかどうか。
    /// 存在確認と作成の間に排他はなく、同時に呼ばれると重複が作られうる
    /// （その場合 `find_direct` は最も古いものを返す）。
    pub async fn execute(
        &self,
        requester: &UserId,
        other: &UserId,
    ) -> Result<(ChatView, bool), ChatError> {
        if requester == other {
            return Err(ChatError::InvalidInput(
                "cannot open a chat with yourself".to_string(),
            ));
        }

        if let Some(chat) = self.chats.find_direct(requester, other).await? {
            return Ok((chat_view(self.users.as_ref(), chat).await, false));
        }

        let now = Timestamp::new(self.clock.now_millis());
        let chat = Chat::direct(IdFactory::chat_id(), requester.clone(), other.clone(), now);
        let chat = self.chats.create(chat).await?;
        tracing::info!(
            chat_id = %chat.id,
            requester = %requester,
            other = %other,
            "direct chat created"
        );
        Ok((chat_view(self.users.as_ref(), chat).await, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::repository::{InMemoryChatRepository, InMemoryUserRepository},
        usecase::test_support::{clock, profile, user},
    };

    fn usecase() -> AccessChatUseCase {
        AccessChatUseCase::new(
            Arc::new(InMemoryChatRepository::new()),
            Arc::new(InMemoryUserRepository::with_profiles([
                profile("u1", "Alice"),
                profile("u2", "Bob"),
            ])),
            clock(),
        )
    }

    #[tokio::test]
    async fn test_access_creates_then_reuses_chat() {
        // テスト項目: 初回は作成され、2 回目は（順序を入れ替えても）同じチャットが返る
        // given (前提条件):
        let usecase = usecase();

        // when (操作):
        let (first, created_first) = usecase.execute(&user("u1"), &user("u2")).await.unwrap();
        let (second, created_second) = usecase.execute(&user("u2"), &user("u1")).await.unwrap();

        // then (期待する結果):
        assert!(created_first);
        assert!(!created_second);
        assert_eq!(first.chat.id, second.chat.id);
        assert!(!first.chat.is_group());
        assert_eq!(
            first
                .members
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Alice", "Bob"]
        );
    }

    #[tokio::test]
    async fn test_access_with_self_is_rejected() {
        // テスト項目: 自分自身との 1:1 チャットは作成できない
        // given (前提条件):
        let usecase = usecase();

        // when (操作):
        let result = usecase.execute(&user("u1"), &user("u1")).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err().code(), "invalid_input");
    }
}
