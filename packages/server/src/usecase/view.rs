//! 読み取りモデル（送信者・メンバー解決済み）の組み立て
//!
//! プロフィールの解決は best-effort。ストアの失敗や未登録のユーザーは
//! `{id, name: id}` の代替プロフィールに落とし、呼び出し元の操作は失敗させない。

use std::collections::HashMap;

use crate::domain::{Chat, ChatView, Message, MessageView, UserId, UserProfile, UserRepository};

pub(crate) async fn resolve_profile(users: &dyn UserRepository, user_id: &UserId) -> UserProfile {
    match users.find_by_id(user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => UserProfile::unresolved(user_id.clone()),
        Err(e) => {
            tracing::warn!(user_id = %user_id, "failed to resolve user profile: {}", e);
            UserProfile::unresolved(user_id.clone())
        }
    }
}

async fn resolve_profiles(users: &dyn UserRepository, ids: &[UserId]) -> Vec<UserProfile> {
    let found = match users.find_many(ids).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!("failed to resolve user profiles: {}", e);
            Vec::new()
        }
    };
    let mut by_id: HashMap<UserId, UserProfile> = found
        .into_iter()
        .map(|profile| (profile.id.clone(), profile))
        .collect();
    ids.iter()
        .map(|id| {
            by_id
                .remove(id)
                .unwrap_or_else(|| UserProfile::unresolved(id.clone()))
        })
        .collect()
}

pub(crate) async fn chat_view(users: &dyn UserRepository, chat: Chat) -> ChatView {
    let members = resolve_profiles(users, &chat.members).await;
    ChatView { chat, members }
}

pub(crate) async fn chat_views(users: &dyn UserRepository, chats: Vec<Chat>) -> Vec<ChatView> {
    let mut views = Vec::with_capacity(chats.len());
    for chat in chats {
        views.push(chat_view(users, chat).await);
    }
    views
}

/// メッセージ一覧に送信者を付ける（送信者ごとに 1 回だけ解決する）
pub(crate) async fn message_views(
    users: &dyn UserRepository,
    messages: Vec<Message>,
) -> Vec<MessageView> {
    let mut senders: Vec<UserId> = Vec::new();
    for message in &messages {
        if !senders.contains(&message.sender) {
            senders.push(message.sender.clone());
        }
    }
    let profiles: HashMap<UserId, UserProfile> = resolve_profiles(users, &senders)
        .await
        .into_iter()
        .map(|profile| (profile.id.clone(), profile))
        .collect();
    messages
        .into_iter()
        .map(|message| {
            let sender = profiles
                .get(&message.sender)
                .cloned()
                .unwrap_or_else(|| UserProfile::unresolved(message.sender.clone()));
            MessageView {
                message,
                sender,
                client_id: None,
            }
        })
        .collect()
}
