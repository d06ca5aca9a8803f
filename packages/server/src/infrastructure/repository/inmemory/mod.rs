mod chat;
mod message;
mod user;

pub use chat::InMemoryChatRepository;
pub use message::InMemoryMessageRepository;
pub use user::InMemoryUserRepository;
