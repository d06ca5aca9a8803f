//! UseCase: メッセージ送信処理（Delivery-State Reconciler）
//!
//! 検証 → 受信者の解決 → 永続化 → 「最新メッセージ」ポインタ更新（best-effort）
//! → ファンアウト（best-effort）の順に進む。永続化に成功するまでファンアウトは行わない。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続化とファンアウトの順序、受信者の解決、best-effort ステップの失敗の扱い
//!
//! ### なぜこのテストが必要か
//! - 永続化に失敗したメッセージが配信されないことを保証
//! - 非正規化の更新失敗が送信自体を失敗させないことを確認
//! - Room 経路と受信者への直接経路の両方に同じメッセージが届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：1:1 チャット・グループチャットへの送信
//! - 異常系：未認証、チャット ID なし、空の本文、非メンバー、永続化失敗
//! - エッジケース：ポインタ更新の失敗、送信者プロフィールの未登録

use std::sync::Arc;

use hanashi_shared::time::Clock;

use crate::domain::{
    Chat, ChatRepository, EventNotifier, IdFactory, Message, MessageContent, MessageDraft,
    MessageRepository, MessageView, NotifyTarget, OutboundEvent, RoomId, SendMessageIntent,
    Timestamp, UserId, UserRepository,
};

use super::{error::SendMessageError, view::resolve_profile};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn EventNotifier>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn EventNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chats,
            messages,
            users,
            notifier,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者（匿名接続なら `None`）
    /// * `intent` - 送信内容
    ///
    /// # Returns
    ///
    /// * `Ok(MessageView)` - 永続化済みのメッセージ（送信者情報付き）
    /// * `Err(SendMessageError)` - 送信失敗（ファンアウトは行われていない）
    pub async fn execute(
        &self,
        sender: Option<&UserId>,
        intent: SendMessageIntent,
    ) -> Result<MessageView, SendMessageError> {
        // 1. 検証
        let sender = sender.ok_or(SendMessageError::NotAuthenticated)?;
        let chat_id = intent.chat_id.ok_or(SendMessageError::ChatIdRequired)?;
        let content = intent.content.and_then(|c| MessageContent::new(c).ok());
        if intent.kind.requires_content() && content.is_none() {
            return Err(SendMessageError::ContentRequired);
        }

        let chat = self
            .chats
            .find_by_id(&chat_id)
            .await?
            .ok_or_else(|| SendMessageError::ChatNotFound(chat_id.to_string()))?;
        if !chat.is_member(sender) {
            return Err(SendMessageError::NotMember {
                user: sender.to_string(),
                chat: chat_id.to_string(),
            });
        }

        // 2. 受信者の解決
        let receiver = intent
            .receiver
            .unwrap_or_else(|| Self::resolve_receiver(&chat, sender));

        // 3. 永続化（ここが失敗したら何も配信しない）
        let now = Timestamp::new(self.clock.now_millis());
        let draft = MessageDraft {
            kind: intent.kind,
            content,
            media: intent.media,
            audio_duration: intent.audio_duration,
        };
        let message = Message::new(
            IdFactory::message_id(),
            chat_id.clone(),
            sender.clone(),
            receiver.clone(),
            draft,
            now,
        );
        let message = self.messages.create(message).await.map_err(|e| {
            tracing::error!(
                chat_id = %chat_id,
                user_id = %sender,
                "failed to persist message: {}",
                e
            );
            SendMessageError::Persistence(e)
        })?;

        // 4. 非正規化（best-effort）
        if let Err(e) = self
            .chats
            .set_latest_message(&chat_id, Some(message.id.clone()), now)
            .await
        {
            tracing::warn!(
                chat_id = %chat_id,
                message_id = %message.id,
                "failed to update latest message: {}",
                e
            );
        }

        // 5. ファンアウト（best-effort）
        let view = MessageView {
            sender: resolve_profile(self.users.as_ref(), sender).await,
            message,
            client_id: intent.client_id,
        };
        let event = OutboundEvent::Message(Box::new(view.clone()));
        self.notifier
            .notify(NotifyTarget::Room(RoomId::from(&chat_id)), &event);
        self.notifier.notify(NotifyTarget::User(receiver), &event);

        tracing::debug!(chat_id = %chat_id, message_id = %view.message.id, "message sent");
        Ok(view)
    }

    /// 1:1 チャットは相手メンバー、グループは慣例として送信者自身
    fn resolve_receiver(chat: &Chat, sender: &UserId) -> UserId {
        if chat.is_group() {
            return sender.clone();
        }
        chat.other_member(sender)
            .cloned()
            .unwrap_or_else(|| sender.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            MessageKind, MockChatRepository, MockMessageRepository, Page, RepositoryError,
            SortOrder,
        },
        infrastructure::repository::{
            InMemoryChatRepository, InMemoryMessageRepository, InMemoryUserRepository,
        },
        usecase::test_support::{
            RecordingNotifier, chat_id, clock, direct_chat, group_chat, profile, user,
        },
    };
    use hanashi_shared::time::FixedClock;

    struct Fixture {
        chats: Arc<InMemoryChatRepository>,
        messages: Arc<InMemoryMessageRepository>,
        notifier: Arc<RecordingNotifier>,
        usecase: SendMessageUseCase,
    }

    async fn fixture(chat: Chat) -> Fixture {
        let chats = Arc::new(InMemoryChatRepository::new());
        chats.create(chat).await.unwrap();
        let messages = Arc::new(InMemoryMessageRepository::new());
        let users = Arc::new(InMemoryUserRepository::with_profiles([
            profile("u1", "Alice"),
            profile("u2", "Bob"),
        ]));
        let notifier = RecordingNotifier::new();
        let usecase = SendMessageUseCase::new(
            chats.clone(),
            messages.clone(),
            users,
            notifier.clone(),
            clock(),
        );
        Fixture {
            chats,
            messages,
            notifier,
            usecase,
        }
    }

    fn text(chat: &str, content: &str) -> SendMessageIntent {
        SendMessageIntent {
            chat_id: Some(chat_id(chat)),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    async fn stored_messages(f: &Fixture, chat: &str) -> Vec<Message> {
        f.messages
            .find_by_chat(&chat_id(chat), Page::default(), SortOrder::Asc)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_send_in_direct_chat_fans_out_to_room_and_receiver() {
        // テスト項目: 1:1 チャットへの送信は Room と受信者の両方に同じメッセージで配信される
        // given (前提条件):
        let f = fixture(direct_chat("C1", "u1", "u2")).await;

        // when (操作):
        let mut intent = text("C1", "hi");
        intent.client_id = Some("tmp-1".to_string());
        let view = f.usecase.execute(Some(&user("u1")), intent).await.unwrap();

        // then (期待する結果):
        assert_eq!(view.message.receiver, user("u2"));
        assert_eq!(view.sender.name, "Alice");
        assert_eq!(view.client_id.as_deref(), Some("tmp-1"));

        let stored = stored_messages(&f, "C1").await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, view.message.id);
        assert!(stored[0].read_by.contains(&user("u1")));
        assert_eq!(stored[0].read_by.len(), 1);

        let events = f.notifier.events();
        assert_eq!(
            f.notifier.targets(),
            vec![
                NotifyTarget::Room(RoomId::new("C1").unwrap()),
                NotifyTarget::User(user("u2")),
            ]
        );
        assert_eq!(events[0].1, events[1].1);
        assert_eq!(events[0].1, OutboundEvent::Message(Box::new(view.clone())));

        let chat = f.chats.find_by_id(&chat_id("C1")).await.unwrap().unwrap();
        assert_eq!(chat.latest_message, Some(view.message.id.clone()));
    }

    #[tokio::test]
    async fn test_group_receiver_is_sender() {
        // テスト項目: グループチャットでは受信者が送信者自身になる
        // given (前提条件):
        let f = fixture(group_chat("G1", "u1", &["u2", "u3"])).await;

        // when (操作):
        let view = f
            .usecase
            .execute(Some(&user("u2")), text("G1", "hello all"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(view.message.receiver, user("u2"));
        assert_eq!(
            f.notifier.targets(),
            vec![
                NotifyTarget::Room(RoomId::new("G1").unwrap()),
                NotifyTarget::User(user("u2")),
            ]
        );
    }

    #[tokio::test]
    async fn test_explicit_receiver_is_kept() {
        // テスト項目: 明示された受信者はそのまま使われる
        // given (前提条件):
        let f = fixture(group_chat("G1", "u1", &["u2", "u3"])).await;
        let mut intent = text("G1", "psst");
        intent.receiver = Some(user("u3"));

        // when (操作):
        let view = f.usecase.execute(Some(&user("u1")), intent).await.unwrap();

        // then (期待する結果):
        assert_eq!(view.message.receiver, user("u3"));
    }

    #[tokio::test]
    async fn test_anonymous_send_is_rejected() {
        // テスト項目: 匿名の送信は not_authenticated で拒否され、何も保存されない
        // given (前提条件):
        let f = fixture(direct_chat("C1", "u1", "u2")).await;

        // when (操作):
        let result = f.usecase.execute(None, text("C1", "hi")).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err().code(), "not_authenticated");
        assert!(stored_messages(&f, "C1").await.is_empty());
        assert!(f.notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failures() {
        // テスト項目: チャット ID なし・空のテキストは拒否され、画像は本文なしで送れる
        // given (前提条件):
        let f = fixture(direct_chat("C1", "u1", "u2")).await;
        let sender = user("u1");

        // when (操作):
        let no_chat = f
            .usecase
            .execute(Some(&sender), SendMessageIntent::default())
            .await;
        let blank = f.usecase.execute(Some(&sender), text("C1", "   ")).await;
        let image = f
            .usecase
            .execute(
                Some(&sender),
                SendMessageIntent {
                    chat_id: Some(chat_id("C1")),
                    kind: MessageKind::Image,
                    ..Default::default()
                },
            )
            .await;

        // then (期待する結果):
        assert_eq!(no_chat.unwrap_err(), SendMessageError::ChatIdRequired);
        assert_eq!(blank.unwrap_err(), SendMessageError::ContentRequired);
        let image = image.unwrap();
        assert!(image.message.content.is_none());
        assert_eq!(f.notifier.events().len(), 2);
    }

    #[tokio::test]
    async fn test_non_member_and_unknown_chat() {
        // テスト項目: 非メンバーの送信・存在しないチャットへの送信は拒否される
        // given (前提条件):
        let f = fixture(direct_chat("C1", "u1", "u2")).await;

        // when (操作):
        let outsider = f.usecase.execute(Some(&user("u3")), text("C1", "hi")).await;
        let unknown = f.usecase.execute(Some(&user("u1")), text("C9", "hi")).await;

        // then (期待する結果):
        assert_eq!(outsider.unwrap_err().code(), "not_allowed");
        assert_eq!(
            unknown.unwrap_err(),
            SendMessageError::ChatNotFound("C9".to_string())
        );
        assert!(f.notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_timestamps_come_from_clock() {
        // テスト項目: メッセージの作成時刻とチャットの更新時刻は注入した Clock の値になる
        // given (前提条件):
        let chats = Arc::new(InMemoryChatRepository::new());
        chats.create(direct_chat("C1", "u1", "u2")).await.unwrap();
        let usecase = SendMessageUseCase::new(
            chats.clone(),
            Arc::new(InMemoryMessageRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            RecordingNotifier::new(),
            Arc::new(FixedClock::new(1_700_000_000_000)),
        );

        // when (操作):
        let view = usecase
            .execute(Some(&user("u1")), text("C1", "hi"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(view.message.created_at, Timestamp::new(1_700_000_000_000));
        assert_eq!(view.message.updated_at, Timestamp::new(1_700_000_000_000));
        let chat = chats.find_by_id(&chat_id("C1")).await.unwrap().unwrap();
        assert_eq!(chat.updated_at, Timestamp::new(1_700_000_000_000));
    }

    #[tokio::test]
    async fn test_persistence_failure_prevents_fanout() {
        // テスト項目: 永続化に失敗した場合は server_error となり、何も配信されない
        // given (前提条件):
        let mut chats = MockChatRepository::new();
        chats
            .expect_find_by_id()
            .returning(|_| Ok(Some(direct_chat("C1", "u1", "u2"))));
        chats.expect_set_latest_message().never();
        let mut messages = MockMessageRepository::new();
        messages
            .expect_create()
            .returning(|_| Err(RepositoryError::Unavailable("disk full".to_string())));
        let notifier = RecordingNotifier::new();
        let usecase = SendMessageUseCase::new(
            Arc::new(chats),
            Arc::new(messages),
            Arc::new(InMemoryUserRepository::new()),
            notifier.clone(),
            clock(),
        );

        // when (操作):
        let result = usecase.execute(Some(&user("u1")), text("C1", "hi")).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err().code(), "server_error");
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_latest_pointer_failure_does_not_fail_send() {
        // テスト項目: 最新メッセージポインタの更新失敗は送信を失敗させず、配信も行われる
        // given (前提条件):
        let mut chats = MockChatRepository::new();
        chats
            .expect_find_by_id()
            .returning(|_| Ok(Some(direct_chat("C1", "u1", "u2"))));
        chats
            .expect_set_latest_message()
            .times(1)
            .returning(|_, _, _| Err(RepositoryError::Conflict("stale".to_string())));
        let messages = Arc::new(InMemoryMessageRepository::new());
        let notifier = RecordingNotifier::new();
        let usecase = SendMessageUseCase::new(
            Arc::new(chats),
            messages.clone(),
            Arc::new(InMemoryUserRepository::new()),
            notifier.clone(),
            clock(),
        );

        // when (操作):
        let view = usecase
            .execute(Some(&user("u1")), text("C1", "hi"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(
            messages
                .find_by_id(&view.message.id)
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(notifier.events().len(), 2);
        // 送信者のプロフィールが見つからない場合は ID を名前として使う
        assert_eq!(view.sender.name, "u1");
    }
}
