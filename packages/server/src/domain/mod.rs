//! ドメイン層
//!
//! 値オブジェクト・エンティティ・インメモリ状態（Presence / Room）と、
//! 外部に依存する部分のインターフェース（trait）を定義する。

pub mod auth;
pub mod connection;
pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod notifier;
pub mod presence;
pub mod pusher;
pub mod repository;
pub mod room;
pub mod value_object;

pub use auth::CredentialVerifier;
pub use connection::{Connection, ConnectionState, Identity};
pub use entity::{
    Chat, ChatKind, ChatView, GROUP_MIN_MEMBERS, Message, MessageDraft, MessageView, RemovalOutcome,
    UserProfile,
};
pub use error::{
    AuthError, ChatRuleError, MessagePushError, RepositoryError, TransitionError, ValueObjectError,
};
pub use event::{
    Ack, DeleteRequest, InboundEvent, OutboundEvent, ReadReceipt, SendMessageIntent, TypingSignal,
};
pub use factory::IdFactory;
pub use notifier::{EventNotifier, NotifyTarget};
pub use presence::PresenceRegistry;
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::{ChatRepository, MessageRepository, ReadFilter, UserRepository};
pub use room::RoomMembership;
pub use value_object::{
    ChatId, ConnectionId, MediaRef, MessageContent, MessageId, MessageKind, Page, ReadBy, RoomId,
    SortOrder, Timestamp, UserId,
};

#[cfg(test)]
pub use auth::MockCredentialVerifier;
#[cfg(test)]
pub use notifier::MockEventNotifier;
#[cfg(test)]
pub use repository::{MockChatRepository, MockMessageRepository, MockUserRepository};
