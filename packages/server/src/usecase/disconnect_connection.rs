//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectConnectionUseCase::execute() メソッド
//! - CLOSED 遷移時の Presence 解除・Room の行の一括削除・オンラインユーザー一覧の配信
//!
//! ### なぜこのテストが必要か
//! - 最後の接続が切れたユーザーがオンライン一覧から消えることを保証
//! - 明示的な leave なしで Room から外れることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：最後の接続の切断
//! - エッジケース：複数接続のうち 1 本だけの切断、匿名接続の切断、二重の切断

use std::sync::Arc;

use crate::domain::{
    Connection, EventNotifier, MessagePusher, NotifyTarget, OutboundEvent, PresenceRegistry, RoomId,
    RoomMembership, TransitionError,
};

/// 切断のユースケース
pub struct DisconnectConnectionUseCase {
    presence: Arc<PresenceRegistry>,
    rooms: Arc<RoomMembership>,
    message_pusher: Arc<dyn MessagePusher>,
    notifier: Arc<dyn EventNotifier>,
}

impl DisconnectConnectionUseCase {
    pub fn new(
        presence: Arc<PresenceRegistry>,
        rooms: Arc<RoomMembership>,
        message_pusher: Arc<dyn MessagePusher>,
        notifier: Arc<dyn EventNotifier>,
    ) -> Self {
        Self {
            presence,
            rooms,
            message_pusher,
            notifier,
        }
    }

    /// 接続を CLOSED にする
    ///
    /// # Returns
    ///
    /// 切断によって抜けた Room の一覧
    pub fn execute(&self, connection: &mut Connection) -> Result<Vec<RoomId>, TransitionError> {
        connection.close()?;

        // 1. Room の行をまとめて削除し、送信チャンネルを解除
        let left_rooms = self.rooms.drop_connection(connection.id());
        self.message_pusher.unregister_connection(connection.id());

        // 2. Presence から削除
        if let Some(user_id) = connection.user_id()
            && self.presence.remove_connection(user_id, connection.id())
        {
            tracing::info!(user_id = %user_id, "user is now offline");
        }

        // 3. 残りの全接続にオンラインユーザー一覧を配信
        self.notifier.notify(
            NotifyTarget::Everyone,
            &OutboundEvent::OnlineUsers(self.presence.list_online_users()),
        );

        tracing::info!(
            connection_id = %connection.id(),
            rooms = left_rooms.len(),
            "connection closed"
        );
        Ok(left_rooms)
    }
}
