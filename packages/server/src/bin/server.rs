//! Hanashi chat server.
//!
//! Run with:
//! ```not_rust
//! HANASHI_JWT_SECRET=secret cargo run --bin hanashi-server
//! cargo run --bin hanashi-server -- --host 0.0.0.0 --port 3000 --jwt-secret secret
//! ```

use std::sync::Arc;

use clap::Parser;
use hanashi_server::{
    config::ServerConfig,
    infrastructure::{
        auth::JwtVerifier,
        repository::{InMemoryChatRepository, InMemoryMessageRepository, InMemoryUserRepository},
    },
    ui::{AppState, Server, Stores},
};
use hanashi_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(
        env!("CARGO_BIN_NAME"),
        &config.log_level,
        config.log_format(),
    );

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. CredentialVerifier
    // 3. AppState (UseCases, Presence Registry, Room Tracker, Fanout Router)
    // 4. Server

    // 1. Create Repositories (in-memory store)
    let stores = Stores {
        chats: Arc::new(InMemoryChatRepository::new()),
        messages: Arc::new(InMemoryMessageRepository::new()),
        users: Arc::new(InMemoryUserRepository::new()),
    };

    // 2. Create CredentialVerifier (HS256 JWT)
    let verifier = Arc::new(JwtVerifier::new(config.jwt_secret.as_bytes()));

    // 3. Create AppState
    let state = Arc::new(AppState::build(stores, verifier, Arc::new(SystemClock)));

    // 4. Create and run the server
    let server = Server::new(state).with_frontend_url(config.frontend_url.clone());
    if let Err(e) = server.run(&config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
