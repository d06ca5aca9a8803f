//! HTTP / WebSocket handlers.

mod http;
mod websocket;

pub use http::{
    access_chat, add_to_group, create_group, delete_chat, delete_message, fetch_chats, get_messages,
    get_presence, health_check, mark_read, remove_from_group, rename_group, send_message,
};
pub use websocket::websocket_handler;
