//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::{
    handler::{
        access_chat, add_to_group, create_group, delete_chat, delete_message, fetch_chats,
        get_messages, get_presence, health_check, mark_read, remove_from_group, rename_group,
        send_message, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(Arc::new(AppState::build(stores, verifier, clock)))
///     .with_frontend_url(Some("http://localhost:5173".to_string()));
/// server.run("127.0.0.1", 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// CORS で許可するオリジン（未指定なら全オリジン）
    frontend_url: Option<String>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            frontend_url: None,
        }
    }

    pub fn with_frontend_url(mut self, frontend_url: Option<String>) -> Self {
        self.frontend_url = frontend_url;
        self
    }

    /// ルーティングを組み立てる
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/presence", get(get_presence))
            .route("/api/chat", get(fetch_chats))
            .route("/api/chat/access", post(access_chat))
            .route("/api/chat/group", post(create_group))
            .route("/api/chat/rename", put(rename_group))
            .route("/api/chat/add", put(add_to_group))
            .route("/api/chat/remove", put(remove_from_group))
            .route("/api/chat/{id}", delete(delete_chat))
            .route("/api/message", post(send_message))
            .route("/api/message/read", put(mark_read))
            .route(
                "/api/message/{id}",
                get(get_messages).delete(delete_message),
            )
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(self.frontend_url.as_deref()))
            .with_state(self.state.clone())
    }

    /// 既に bind 済みの listener で待ち受ける（Ctrl+C で graceful shutdown）
    pub async fn serve(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let app = self.router();
        tracing::info!("Chat server listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Run the chat server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;
        Ok(())
    }
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let origin = match frontend_url {
        Some(url) => match HeaderValue::from_str(url) {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(e) => {
                tracing::warn!("Ignoring invalid frontend url '{}': {}", url, e);
                AllowOrigin::any()
            }
        },
        None => AllowOrigin::any(),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
