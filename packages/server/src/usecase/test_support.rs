//! UseCase テスト用の共通部品

use std::sync::{Arc, Mutex};

use hanashi_shared::time::{Clock, SteppingClock};

use crate::domain::{
    Chat, ChatId, EventNotifier, Message, MessageContent, MessageDraft, MessageId, MessageKind,
    NotifyTarget, OutboundEvent, Timestamp, UserId, UserProfile,
};

/// 通知を記録するだけの EventNotifier
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(NotifyTarget, OutboundEvent)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<(NotifyTarget, OutboundEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn targets(&self) -> Vec<NotifyTarget> {
        self.events()
            .into_iter()
            .map(|(target, _)| target)
            .collect()
    }
}

impl EventNotifier for RecordingNotifier {
    fn notify(&self, target: NotifyTarget, event: &OutboundEvent) {
        self.events.lock().unwrap().push((target, event.clone()));
    }
}

pub fn clock() -> Arc<dyn Clock> {
    Arc::new(SteppingClock::new(1_000, 10))
}

pub fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub fn chat_id(id: &str) -> ChatId {
    ChatId::new(id).unwrap()
}

pub fn profile(id: &str, name: &str) -> UserProfile {
    UserProfile::new(user(id), name, "")
}

pub fn direct_chat(id: &str, a: &str, b: &str) -> Chat {
    Chat::direct(chat_id(id), user(a), user(b), Timestamp::new(0))
}

pub fn group_chat(id: &str, creator: &str, others: &[&str]) -> Chat {
    Chat::group(
        chat_id(id),
        "group".to_string(),
        String::new(),
        user(creator),
        others.iter().map(|o| user(o)).collect(),
        Timestamp::new(0),
    )
}

pub fn text_message(id: &str, chat: &str, sender: &str, receiver: &str, at: i64) -> Message {
    Message::new(
        MessageId::new(id).unwrap(),
        chat_id(chat),
        user(sender),
        user(receiver),
        MessageDraft {
            kind: MessageKind::Text,
            content: Some(MessageContent::new(format!("message {id}")).unwrap()),
            media: None,
            audio_duration: None,
        },
        Timestamp::new(at),
    )
}
