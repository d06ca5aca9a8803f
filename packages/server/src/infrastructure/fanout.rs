//! Fanout Router
//!
//! 通知先（Room / ユーザー / 接続 / 全員）を生存中の接続 ID 集合に展開し、
//! 1 回だけシリアライズしたフレームを MessagePusher で送る。
//!
//! - Room への配送は Room に join している接続だけが対象（チャットのメンバーかどうかは見ない）
//! - ユーザーへの配送は Presence Registry から接続を引く（Room 参加状況は見ない）
//! - Room 経路とユーザー経路の重複排除はしない。同じ接続に 2 回届くことがあり、
//!   クライアントはメッセージ ID で重複を除く
//! - 到達できない接続は黙って捨てる（再送しない）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, EventNotifier, MessagePusher, NotifyTarget, OutboundEvent, PresenceRegistry,
    RoomId, RoomMembership, UserId,
};
use crate::infrastructure::dto::websocket::ServerEvent;

pub struct FanoutRouter {
    presence: Arc<PresenceRegistry>,
    rooms: Arc<RoomMembership>,
    pusher: Arc<dyn MessagePusher>,
}

impl FanoutRouter {
    pub fn new(
        presence: Arc<PresenceRegistry>,
        rooms: Arc<RoomMembership>,
        pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            presence,
            rooms,
            pusher,
        }
    }

    /// Room に join している全接続へ送る。送信できた接続数を返す
    pub fn emit_to_room(&self, room_id: &RoomId, event: &OutboundEvent) -> usize {
        let targets = self.rooms.members(room_id);
        self.deliver(&targets, event)
    }

    /// 送信元の接続を除いて Room に送る
    pub fn emit_to_room_except(
        &self,
        room_id: &RoomId,
        except: &ConnectionId,
        event: &OutboundEvent,
    ) -> usize {
        let targets: Vec<ConnectionId> = self
            .rooms
            .members(room_id)
            .into_iter()
            .filter(|connection_id| connection_id != except)
            .collect();
        self.deliver(&targets, event)
    }

    /// ユーザーの全接続へ送る。送信できた接続数を返す
    pub fn emit_to_user(&self, user_id: &UserId, event: &OutboundEvent) -> usize {
        let targets: Vec<ConnectionId> = self
            .presence
            .list_connections(user_id)
            .into_iter()
            .collect();
        self.deliver(&targets, event)
    }

    fn deliver(&self, targets: &[ConnectionId], event: &OutboundEvent) -> usize {
        if targets.is_empty() {
            return 0;
        }
        let frame = match ServerEvent::from(event).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(event = event.name(), "failed to serialize event: {}", e);
                return 0;
            }
        };
        let delivered = self.pusher.broadcast(targets, &frame);
        tracing::debug!(
            event = event.name(),
            targets = targets.len(),
            delivered,
            "event fanned out"
        );
        delivered
    }
}

impl EventNotifier for FanoutRouter {
    fn notify(&self, target: NotifyTarget, event: &OutboundEvent) {
        match target {
            NotifyTarget::Room(room_id) => self.emit_to_room(&room_id, event),
            NotifyTarget::RoomExcept { room, except } => {
                self.emit_to_room_except(&room, &except, event)
            }
            NotifyTarget::User(user_id) => self.emit_to_user(&user_id, event),
            NotifyTarget::Connection(connection_id) => self.deliver(&[connection_id], event),
            NotifyTarget::Everyone => self.deliver(&self.pusher.connection_ids(), event),
        };
    }
}
