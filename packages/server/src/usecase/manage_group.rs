//! UseCase: グループチャットの管理（作成・名前変更・メンバー追加・メンバー削除）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ManageGroupUseCase の各操作
//! - 管理者権限の確認と、最小メンバー数を下回ったときのチャット削除
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成時の `group_created` 通知、管理者による名前変更・追加
//! - 異常系：非管理者の操作、既存メンバーの追加、空のグループ名
//! - エッジケース：本人による退出、残り 1 人になったときのメッセージごとの削除

use std::sync::Arc;

use hanashi_shared::time::Clock;

use crate::domain::{
    Chat, ChatId, ChatRepository, ChatView, EventNotifier, GROUP_MIN_MEMBERS, IdFactory,
    MessageRepository, NotifyTarget, OutboundEvent, RemovalOutcome, Timestamp, UserId,
    UserRepository,
};

use super::{error::ChatError, view::chat_view};

/// グループの作成内容
#[derive(Debug, Clone, Default)]
pub struct NewGroup {
    pub name: Option<String>,
    pub users: Vec<UserId>,
    pub avatar: Option<String>,
}

/// メンバー削除の結果
#[derive(Debug, Clone, PartialEq)]
pub enum MemberRemoval {
    Updated(ChatView),
    /// 最小メンバー数を下回ったためチャットごと削除した
    Deleted(ChatId),
}

pub struct ManageGroupUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn EventNotifier>,
    clock: Arc<dyn Clock>,
}

impl ManageGroupUseCase {
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

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// グループを作成し、全メンバーへ `group_created` を通知
    pub async fn create(&self, creator: &UserId, group: NewGroup) -> Result<ChatView, ChatError> {
        let name = group
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ChatError::InvalidInput("group name is required".to_string()))?;

        let chat = Chat::group(
            IdFactory::chat_id(),
            name,
            group.avatar.unwrap_or_default(),
            creator.clone(),
            group.users,
            self.now(),
        );
        if chat.members.len() < GROUP_MIN_MEMBERS {
            return Err(ChatError::InvalidInput(
                "a group needs at least one other user".to_string(),
            ));
        }

        let chat = self.chats.create(chat).await?;
        tracing::info!(
            chat_id = %chat.id,
            creator = %creator,
            members = chat.members.len(),
            "group created"
        );

        let view = chat_view(self.users.as_ref(), chat).await;
        let event = OutboundEvent::GroupCreated(Box::new(view.clone()));
        for member in &view.chat.members {
            self.notifier
                .notify(NotifyTarget::User(member.clone()), &event);
        }
        Ok(view)
    }

    /// グループ名・アバターの変更（管理者のみ）
    pub async fn rename(
        &self,
        requester: &UserId,
        chat_id: &ChatId,
        name: Option<String>,
        avatar: Option<String>,
    ) -> Result<ChatView, ChatError> {
        let mut chat = self.load_group(chat_id).await?;
        Self::ensure_admin(&chat, requester)?;
        chat.rename(name, avatar, self.now())?;
        let chat = self.chats.update(chat).await?;
        Ok(chat_view(self.users.as_ref(), chat).await)
    }

    /// メンバーの追加（管理者のみ）
    pub async fn add_member(
        &self,
        requester: &UserId,
        chat_id: &ChatId,
        user_id: UserId,
    ) -> Result<ChatView, ChatError> {
        let mut chat = self.load_group(chat_id).await?;
        Self::ensure_admin(&chat, requester)?;
        chat.add_member(user_id, self.now())?;
        let chat = self.chats.update(chat).await?;
        Ok(chat_view(self.users.as_ref(), chat).await)
    }

    /// メンバーの削除（管理者、または本人の退出）
    ///
    /// 残りが最小メンバー数を下回った場合は、メッセージを削除してからチャットを削除する。
    pub async fn remove_member(
        &self,
        requester: &UserId,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<MemberRemoval, ChatError> {
        let mut chat = self.load_group(chat_id).await?;
        if requester != user_id {
            Self::ensure_admin(&chat, requester)?;
        }

        match chat.remove_member(user_id, self.now())? {
            RemovalOutcome::Remaining(_) => {
                let chat = self.chats.update(chat).await?;
                Ok(MemberRemoval::Updated(
                    chat_view(self.users.as_ref(), chat).await,
                ))
            }
            RemovalOutcome::BelowMinimum => {
                let removed = self.messages.delete_by_chat(chat_id).await?;
                self.chats.delete(chat_id).await?;
                tracing::info!(
                    chat_id = %chat_id,
                    messages = removed,
                    "group deleted after falling below minimum members"
                );
                Ok(MemberRemoval::Deleted(chat_id.clone()))
            }
        }
    }

    async fn load_group(&self, chat_id: &ChatId) -> Result<Chat, ChatError> {
        self.chats
            .find_by_id(chat_id)
            .await?
            .ok_or_else(|| ChatError::ChatNotFound(chat_id.to_string()))
    }

    fn ensure_admin(chat: &Chat, requester: &UserId) -> Result<(), ChatError> {
        if chat.is_admin(requester) {
            Ok(())
        } else {
            Err(ChatError::NotAllowed(format!(
                "user '{}' is not an admin of chat '{}'",
                requester, chat.id
            )))
        }
    }
}
