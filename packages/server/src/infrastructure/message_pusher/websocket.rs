//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を接続 ID をキーに管理
//! - シリアライズ済みフレームの送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、フレームの送信に使用します。
//! 送信はチャンネルへの積み込みのみで await しないため、ロックは `std::sync::RwLock` で足ります。

use std::{collections::HashMap, sync::RwLock};

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// Key: 接続 ID, Value: その接続の送信チャンネル
    connections: RwLock<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessagePusher for WebSocketMessagePusher {
    fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.write().unwrap_or_else(|e| e.into_inner());
        tracing::debug!(connection_id = %connection_id, "connection registered to pusher");
        connections.insert(connection_id, sender);
    }

    fn unregister_connection(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.write().unwrap_or_else(|e| e.into_inner());
        if connections.remove(connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "connection unregistered from pusher");
        }
    }

    fn push_to(&self, connection_id: &ConnectionId, content: &str) -> Result<(), MessagePushError> {
        let connections = self.connections.read().unwrap_or_else(|e| e.into_inner());
        let sender = connections
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }

    fn broadcast(&self, targets: &[ConnectionId], content: &str) -> usize {
        let connections = self.connections.read().unwrap_or_else(|e| e.into_inner());
        let mut delivered = 0;
        for target in targets {
            match connections.get(target) {
                // 閉じかけの接続への送信失敗は黙って捨てる
                Some(sender) => match sender.send(content.to_string()) {
                    Ok(()) => delivered += 1,
                    Err(_) => {
                        tracing::debug!(
                            connection_id = %target,
                            "connection is closing, frame dropped"
                        );
                    }
                },
                None => {
                    tracing::debug!(
                        connection_id = %target,
                        "connection not found during broadcast, skipping"
                    );
                }
            }
        }
        delivered
    }

    fn connection_ids(&self) -> Vec<ConnectionId> {
        let connections = self.connections.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<ConnectionId> = connections.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定の接続への送信
    // - broadcast: 複数接続への送信と送信数
    // - 閉じた接続・未登録の接続の扱い
    //
    // 【どのようなシナリオをテストするか】
    // 1. push_to の成功ケース
    // 2. push_to の失敗ケース（接続が存在しない）
    // 3. broadcast で未登録・受信側が閉じた接続を黙ってスキップ
    // 4. unregister 後は送信されない
    // ========================================

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定の接続にフレームを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn("c1"), tx);

        // when (操作):
        let result = pusher.push_to(&conn("c1"), "Hello");

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_connection_not_found() {
        // テスト項目: 存在しない接続への送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&conn("ghost"), "Hello");

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ConnectionNotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_broadcast_skips_unreachable_connections() {
        // テスト項目: 未登録・受信側が閉じた接続は黙ってスキップされる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        pusher.register_connection(conn("c1"), tx1);
        pusher.register_connection(conn("c2"), tx2);
        drop(rx2);

        // when (操作):
        let delivered = pusher.broadcast(&[conn("c1"), conn("c2"), conn("ghost")], "event");

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert_eq!(rx1.recv().await, Some("event".to_string()));
    }

    #[tokio::test]
    async fn test_unregister_connection() {
        // テスト項目: 登録解除した接続は一覧から消え、送信対象にならない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn("c1"), tx);

        // when (操作):
        pusher.unregister_connection(&conn("c1"));

        // then (期待する結果):
        assert!(pusher.connection_ids().is_empty());
        assert_eq!(pusher.broadcast(&[conn("c1")], "event"), 0);
    }
}
