//! Repository trait 定義
//!
//! ドメイン層が必要とする永続化ストアのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ストアは唯一の正（single source of truth）であり、
//! UseCase 層はここに書き込みが成功してからファンアウトを行います。

use async_trait::async_trait;

use super::{
    entity::{Chat, Message, UserProfile},
    error::RepositoryError,
    value_object::{ChatId, MessageId, Page, SortOrder, Timestamp, UserId},
};

/// 既読化の対象
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadFilter {
    /// 単一メッセージ
    Message(MessageId),
    /// チャット内の全メッセージ
    Chat(ChatId),
}

/// Chat Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// ID でチャットを取得
    async fn find_by_id(&self, id: &ChatId) -> Result<Option<Chat>, RepositoryError>;

    /// 2 人の間の 1:1 チャットを取得（順不同）
    async fn find_direct(&self, a: &UserId, b: &UserId) -> Result<Option<Chat>, RepositoryError>;

    /// ユーザーが所属するチャットを更新日時の降順で取得
    async fn find_for_member(
        &self,
        user_id: &UserId,
        page: Page,
    ) -> Result<Vec<Chat>, RepositoryError>;

    /// チャットを作成
    async fn create(&self, chat: Chat) -> Result<Chat, RepositoryError>;

    /// チャットを上書き保存
    async fn update(&self, chat: Chat) -> Result<Chat, RepositoryError>;

    /// 「最新メッセージ」ポインタを更新（非正規化）。更新日時も進める
    async fn set_latest_message(
        &self,
        id: &ChatId,
        message_id: Option<MessageId>,
        now: Timestamp,
    ) -> Result<(), RepositoryError>;

    /// チャットを削除。存在した場合のみ `true`
    async fn delete(&self, id: &ChatId) -> Result<bool, RepositoryError>;
}

/// Message Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを作成
    async fn create(&self, message: Message) -> Result<Message, RepositoryError>;

    /// ID でメッセージを取得
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError>;

    /// チャット内のメッセージを作成日時順に取得
    async fn find_by_chat(
        &self,
        chat_id: &ChatId,
        page: Page,
        order: SortOrder,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// チャット内の最新メッセージを取得
    async fn find_latest(&self, chat_id: &ChatId) -> Result<Option<Message>, RepositoryError>;

    /// 既読集合に user_id を加える（集合の和）。新たに既読になった件数を返す
    async fn mark_read(&self, filter: ReadFilter, user_id: &UserId)
    -> Result<usize, RepositoryError>;

    /// メッセージを物理削除。存在した場合のみ `true`
    async fn delete(&self, id: &MessageId) -> Result<bool, RepositoryError>;

    /// チャット内の全メッセージを物理削除。削除件数を返す
    async fn delete_by_chat(&self, chat_id: &ChatId) -> Result<usize, RepositoryError>;
}

/// User Repository trait
///
/// ユーザー登録・認証は外部の責務で、ここでは送信者情報の参照のみを扱う。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;

    /// 見つかったユーザーのみを返す（順序は ids に従う）
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, RepositoryError>;

    async fn upsert(&self, profile: UserProfile) -> Result<(), RepositoryError>;
}
