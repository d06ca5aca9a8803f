//! MessagePusher trait 定義
//!
//! 生存中の接続ごとの送信チャンネルを管理し、シリアライズ済みのフレームを送る。
//! 送信は同期かつ即時（キューへの積み込みのみ）で、await を伴わない。

use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// 接続へ送るフレームのチャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// UI 層が生成した `PusherChannel` を受け取り、接続 ID をキーに保持する。
pub trait MessagePusher: Send + Sync {
    /// 接続を登録
    fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の登録を解除
    fn unregister_connection(&self, connection_id: &ConnectionId);

    /// 特定の接続へ送信
    fn push_to(&self, connection_id: &ConnectionId, content: &str) -> Result<(), MessagePushError>;

    /// 複数の接続へ送信。到達しない接続は黙ってスキップし、送信できた数を返す
    fn broadcast(&self, targets: &[ConnectionId], content: &str) -> usize;

    /// 登録中の全接続
    fn connection_ids(&self) -> Vec<ConnectionId>;
}
