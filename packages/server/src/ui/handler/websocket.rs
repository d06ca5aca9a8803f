//! WebSocket connection handlers.
//!
//! 1 本の WebSocket が 1 つの `Connection`。ハンドシェイクで 1 回だけ認証し、
//! 以降のフレームは受信順に 1 つずつ処理する。

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{Ack, Connection, IdFactory, InboundEvent},
    infrastructure::dto::websocket::{AckDto, ClientFrame, FrameError, ServerEvent},
    ui::{extractor::bearer_credential, state::AppState},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    /// ベアラートークン（ブラウザは WebSocket にヘッダーを付けられないため）
    #[serde(default)]
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    // クエリを優先し、なければ Authorization ヘッダー
    let credential = query
        .token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| bearer_credential(&headers));

    ws.on_upgrade(move |socket| handle_socket(socket, state, credential))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Channel receiver for frames fanned out to this connection
/// * `sender` - WebSocket sink to send frames to this client
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, credential: Option<String>) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    // CONNECTING → AUTHENTICATED / ANONYMOUS → ACTIVE
    let mut connection = match state.connect_connection_usecase.execute(
        IdFactory::connection_id(),
        credential.as_deref(),
        tx,
    ) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::error!("Failed to activate connection: {}", e);
            return;
        }
    };

    let mut send_task = pusher_loop(rx, sender);

    let recv_state = state.clone();
    let recv_connection = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(connection_id = %recv_connection.id(), "WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_frame(&recv_state, &recv_connection, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::trace!("Received ping");
                    // Pong は axum が自動で返す
                }
                Message::Close(_) => {
                    tracing::debug!(
                        connection_id = %recv_connection.id(),
                        "Client requested close"
                    );
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // → CLOSED
    if let Err(e) = state
        .disconnect_connection_usecase
        .execute(&mut connection)
    {
        tracing::warn!(connection_id = %connection.id(), "Failed to close connection: {}", e);
    }
}

/// 受信フレームを 1 つ処理する
///
/// - JSON として読めないフレームは破棄
/// - 未知のイベントは破棄（ack も返さない）
/// - ペイロードが不正なら、ack が要求されていれば `invalid_payload` を返す
async fn handle_frame(state: &AppState, connection: &Connection, text: &str) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(connection_id = %connection.id(), "Dropping malformed frame: {}", e);
            return;
        }
    };
    let ack_id = frame.ack;

    let event = match InboundEvent::try_from(frame) {
        Ok(event) => event,
        Err(FrameError::UnknownEvent(name)) => {
            tracing::debug!(
                connection_id = %connection.id(),
                event = %name,
                "Dropping unknown event"
            );
            return;
        }
        Err(e) => {
            tracing::warn!(connection_id = %connection.id(), "Rejecting frame: {}", e);
            if let Some(id) = ack_id {
                reply(state, connection, id, &Ack::Rejected(e.code()));
            }
            return;
        }
    };

    let ack = state.dispatcher.dispatch(connection, event).await;
    if let Some(id) = ack_id {
        reply(state, connection, id, &ack);
    }
}

/// ack はファンアウトを通さず、要求元の接続にだけ送る
fn reply(state: &AppState, connection: &Connection, id: u64, ack: &Ack) {
    let frame = ServerEvent::Ack(AckDto::from_ack(id, ack));
    match frame.to_json() {
        Ok(json) => {
            if let Err(e) = state.message_pusher.push_to(connection.id(), &json) {
                tracing::warn!(connection_id = %connection.id(), "Failed to send ack: {}", e);
            }
        }
        Err(e) => tracing::error!("Failed to serialize ack: {}", e),
    }
}
