//! Infrastructure 層
//!
//! ドメイン層の trait に対する具体的な実装（インメモリストア・WebSocket 送信・JWT 検証）と、
//! ワイヤーフォーマットの DTO。

pub mod auth;
pub mod dto;
pub mod fanout;
pub mod message_pusher;
pub mod repository;

pub use fanout::FanoutRouter;
