//! エンティティ（Entity）
//!
//! - `Chat`: 1:1 チャットまたはグループチャット
//! - `Message`: 永続化されるメッセージ
//! - `UserProfile`: 送信者情報として添付されるユーザー概要
//!
//! `MessageView` / `ChatView` は参照先（送信者・メンバー）を解決済みの読み取りモデルで、
//! ファンアウト時にクライアントへ送る完全なオブジェクトの元になる。

use serde::{Deserialize, Serialize};

use super::{
    error::ChatRuleError,
    value_object::{
        ChatId, MediaRef, MessageContent, MessageId, MessageKind, ReadBy, Timestamp, UserId,
    },
};

/// グループの存続に必要な最小メンバー数
pub const GROUP_MIN_MEMBERS: usize = 2;

/// ユーザー概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub avatar: String,
}

impl UserProfile {
    pub fn new(id: UserId, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: avatar.into(),
        }
    }

    /// プロフィールが解決できなかったユーザーの代替表現
    pub fn unresolved(id: UserId) -> Self {
        let name = id.as_str().to_string();
        Self {
            id,
            name,
            avatar: String::new(),
        }
    }
}

/// チャット種別
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatKind {
    Direct,
    Group { name: String, avatar: String },
}

/// メンバー削除の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// 最小メンバー数以上が残っている
    Remaining(usize),
    /// 最小メンバー数を下回った（チャットごと削除すべき）
    BelowMinimum,
}

/// チャット
///
/// `members` は管理者を含む全メンバー（順序保持・重複なし）、
/// `admins` はその部分集合。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub kind: ChatKind,
    pub members: Vec<UserId>,
    pub admins: Vec<UserId>,
    pub latest_message: Option<MessageId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Chat {
    /// 1:1 チャットを作成（作成者が管理者）
    pub fn direct(id: ChatId, requester: UserId, other: UserId, now: Timestamp) -> Self {
        let mut members = vec![requester.clone()];
        if other != requester {
            members.push(other);
        }
        Self {
            id,
            kind: ChatKind::Direct,
            members,
            admins: vec![requester],
            latest_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// グループチャットを作成（作成者が唯一の管理者、メンバーは重複排除）
    pub fn group(
        id: ChatId,
        name: String,
        avatar: String,
        creator: UserId,
        others: Vec<UserId>,
        now: Timestamp,
    ) -> Self {
        let mut members = vec![creator.clone()];
        for user in others {
            if !members.contains(&user) {
                members.push(user);
            }
        }
        Self {
            id,
            kind: ChatKind::Group { name, avatar },
            members,
            admins: vec![creator],
            latest_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ChatKind::Group { .. })
    }

    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.members.contains(user_id)
    }

    pub fn is_admin(&self, user_id: &UserId) -> bool {
        self.admins.contains(user_id)
    }

    /// 1:1 チャットにおける相手メンバー
    pub fn other_member(&self, user_id: &UserId) -> Option<&UserId> {
        self.members.iter().find(|member| *member != user_id)
    }

    /// 2 人の組み合わせ（順不同）の 1:1 チャットか
    pub fn is_direct_between(&self, a: &UserId, b: &UserId) -> bool {
        !self.is_group() && self.is_member(a) && self.is_member(b)
    }

    pub fn rename(
        &mut self,
        new_name: Option<String>,
        new_avatar: Option<String>,
        now: Timestamp,
    ) -> Result<(), ChatRuleError> {
        let ChatKind::Group { name, avatar } = &mut self.kind else {
            return Err(ChatRuleError::NotAGroup);
        };
        if let Some(new_name) = new_name.filter(|n| !n.trim().is_empty()) {
            *name = new_name.trim().to_string();
        }
        if let Some(new_avatar) = new_avatar.filter(|a| !a.is_empty()) {
            *avatar = new_avatar;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn add_member(&mut self, user_id: UserId, now: Timestamp) -> Result<(), ChatRuleError> {
        if !self.is_group() {
            return Err(ChatRuleError::NotAGroup);
        }
        if self.is_member(&user_id) {
            return Err(ChatRuleError::AlreadyMember(user_id.into_string()));
        }
        self.members.push(user_id);
        self.updated_at = now;
        Ok(())
    }

    /// メンバーと管理者の両方から削除する
    pub fn remove_member(
        &mut self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<RemovalOutcome, ChatRuleError> {
        if !self.is_group() {
            return Err(ChatRuleError::NotAGroup);
        }
        if !self.is_member(user_id) {
            return Err(ChatRuleError::NotMember(user_id.as_str().to_string()));
        }
        self.members.retain(|member| member != user_id);
        self.admins.retain(|admin| admin != user_id);
        self.updated_at = now;

        if self.members.len() < GROUP_MIN_MEMBERS {
            Ok(RemovalOutcome::BelowMinimum)
        } else {
            Ok(RemovalOutcome::Remaining(self.members.len()))
        }
    }
}

/// メッセージ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender: UserId,
    pub receiver: UserId,
    pub kind: MessageKind,
    pub content: Option<MessageContent>,
    pub media: Option<MediaRef>,
    pub audio_duration: Option<f64>,
    pub read_by: ReadBy,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// 永続化前のメッセージ内容
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    pub kind: MessageKind,
    pub content: Option<MessageContent>,
    pub media: Option<MediaRef>,
    pub audio_duration: Option<f64>,
}

impl Message {
    /// 既読集合は送信者のみで初期化される
    pub fn new(
        id: MessageId,
        chat_id: ChatId,
        sender: UserId,
        receiver: UserId,
        draft: MessageDraft,
        now: Timestamp,
    ) -> Self {
        let read_by = ReadBy::with_sender(&sender);
        Self {
            id,
            chat_id,
            sender,
            receiver,
            kind: draft.kind,
            content: draft.content,
            media: draft.media,
            audio_duration: draft.audio_duration,
            read_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// 既読にする。新たに既読になった場合のみ `true`
    pub fn mark_read_by(&mut self, user_id: &UserId) -> bool {
        self.read_by.insert(user_id)
    }
}

/// 送信者解決済みのメッセージ
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub message: Message,
    pub sender: UserProfile,
    /// クライアントが付与した一時 ID（重複排除用にそのまま返す）
    pub client_id: Option<String>,
}

/// メンバー解決済みのチャット
#[derive(Debug, Clone, PartialEq)]
pub struct ChatView {
    pub chat: Chat,
    pub members: Vec<UserProfile>,
}

impl ChatView {
    pub fn admin_profiles(&self) -> Vec<UserProfile> {
        self.members
            .iter()
            .filter(|profile| self.chat.is_admin(&profile.id))
            .cloned()
            .collect()
    }
}
