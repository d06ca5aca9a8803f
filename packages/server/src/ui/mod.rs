//! Axum server: WebSocket と HTTP API のエンドポイント。

mod error;
mod extractor;
mod handler;
mod server;
mod signal;
pub mod state;

pub use error::ApiError;
pub use server::Server;
pub use state::{AppState, Stores};
