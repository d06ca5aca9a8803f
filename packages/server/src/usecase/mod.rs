//! UseCase 層
//!
//! 接続のライフサイクル、受信イベントの処理、チャット管理の各ユースケース。

pub mod access_chat;
pub mod connect_connection;
pub mod delete_chat;
pub mod delete_message;
pub mod disconnect_connection;
pub mod dispatch;
pub mod error;
pub mod fetch_chats;
pub mod get_messages;
pub mod manage_group;
pub mod mark_read;
pub mod room_membership;
pub mod send_message;
pub mod typing;
mod view;

#[cfg(test)]
mod test_support;

pub use access_chat::AccessChatUseCase;
pub use connect_connection::ConnectConnectionUseCase;
pub use delete_chat::DeleteChatUseCase;
pub use delete_message::DeleteMessageUseCase;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use dispatch::EventDispatcher;
pub use error::{ChatError, DeleteMessageError, MarkReadError, SendMessageError};
pub use fetch_chats::FetchChatsUseCase;
pub use get_messages::GetMessagesUseCase;
pub use manage_group::{ManageGroupUseCase, MemberRemoval, NewGroup};
pub use mark_read::MarkReadUseCase;
pub use room_membership::RoomMembershipUseCase;
pub use send_message::SendMessageUseCase;
pub use typing::TypingUseCase;
