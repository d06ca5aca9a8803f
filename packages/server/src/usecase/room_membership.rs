//! UseCase: Room への join / leave

use std::sync::Arc;

use crate::domain::{Ack, Connection, RoomId, RoomMembership};

pub const CODE_ROOM_ID_REQUIRED: &str = "roomId required";

pub struct RoomMembershipUseCase {
    rooms: Arc<RoomMembership>,
}

impl RoomMembershipUseCase {
    pub fn new(rooms: Arc<RoomMembership>) -> Self {
        Self { rooms }
    }

    /// join は冪等。匿名接続も join できる
    pub fn join(&self, connection: &Connection, room_id: Option<RoomId>) -> Ack {
        let Some(room_id) = room_id else {
            return Ack::Rejected(CODE_ROOM_ID_REQUIRED);
        };
        if self.rooms.join(connection.id(), &room_id) {
            tracing::debug!(connection_id = %connection.id(), room_id = %room_id, "joined room");
        }
        Ack::Done
    }

    /// join していない Room からの leave は何もしない
    pub fn leave(&self, connection: &Connection, room_id: Option<RoomId>) -> Ack {
        let Some(room_id) = room_id else {
            return Ack::Rejected(CODE_ROOM_ID_REQUIRED);
        };
        if self.rooms.leave(connection.id(), &room_id) {
            tracing::debug!(connection_id = %connection.id(), room_id = %room_id, "left room");
        }
        Ack::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionId;

    fn connection() -> Connection {
        Connection::new(ConnectionId::new("c1").unwrap())
    }

    #[test]
    fn test_join_and_leave_are_idempotent() {
        // テスト項目: join / leave を繰り返してもエラーにならない
        // given (前提条件):
        let rooms = Arc::new(RoomMembership::new());
        let usecase = RoomMembershipUseCase::new(rooms.clone());
        let conn = connection();
        let room_id = RoomId::new("C1").unwrap();

        // when (操作):
        let acks = [
            usecase.join(&conn, Some(room_id.clone())),
            usecase.join(&conn, Some(room_id.clone())),
            usecase.leave(&conn, Some(room_id.clone())),
            usecase.leave(&conn, Some(room_id.clone())),
        ];

        // then (期待する結果):
        assert!(acks.iter().all(|ack| *ack == Ack::Done));
        assert!(rooms.members(&room_id).is_empty());
    }

    #[test]
    fn test_missing_room_id_is_rejected() {
        // テスト項目: Room ID の指定がない join は拒否される
        // given (前提条件):
        let usecase = RoomMembershipUseCase::new(Arc::new(RoomMembership::new()));

        // when (操作):
        let ack = usecase.join(&connection(), None);

        // then (期待する結果):
        assert_eq!(ack, Ack::Rejected("roomId required"));
    }
}
