//! Room Membership Tracker
//!
//! 「どの接続がどの Room に join しているか」を接続 ID をキーにした行として保持する。
//! Room 自体は永続化されず、join している接続がなくなれば存在しなくなる。
//!
//! 再接続時の再 join はクライアントの責務で、接続が閉じたら `drop_connection` で
//! その接続の行をまとめて削除する。

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Mutex,
};

use super::value_object::{ConnectionId, RoomId};

#[derive(Debug, Default)]
struct Memberships {
    by_connection: BTreeMap<ConnectionId, BTreeSet<RoomId>>,
    by_room: BTreeMap<RoomId, BTreeSet<ConnectionId>>,
}

#[derive(Debug, Default)]
pub struct RoomMembership {
    inner: Mutex<Memberships>,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Room に join する。既に join 済みなら `false`
    pub fn join(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let added = inner
            .by_connection
            .entry(connection_id.clone())
            .or_default()
            .insert(room_id.clone());
        inner
            .by_room
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id.clone());
        added
    }

    /// Room から leave する。join していなければ何もせず `false`
    pub fn leave(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let removed = match inner.by_connection.get_mut(connection_id) {
            Some(rooms) => {
                let removed = rooms.remove(room_id);
                if rooms.is_empty() {
                    inner.by_connection.remove(connection_id);
                }
                removed
            }
            None => false,
        };
        if removed {
            Self::detach(&mut inner.by_room, room_id, connection_id);
        }
        removed
    }

    /// Room に join している接続
    pub fn members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .by_room
            .get(room_id)
            .map(|connections| connections.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 接続が join している Room
    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .by_connection
            .get(connection_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 接続の全行を削除し、抜けた Room を返す
    pub fn drop_connection(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let Some(rooms) = inner.by_connection.remove(connection_id) else {
            return Vec::new();
        };
        for room_id in &rooms {
            Self::detach(&mut inner.by_room, room_id, connection_id);
        }
        rooms.into_iter().collect()
    }

    /// 現在存在する Room の数
    pub fn room_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.by_room.len()
    }

    fn detach(
        by_room: &mut BTreeMap<RoomId, BTreeSet<ConnectionId>>,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) {
        if let Some(connections) = by_room.get_mut(room_id) {
            connections.remove(connection_id);
            if connections.is_empty() {
                by_room.remove(room_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id).unwrap()
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id).unwrap()
    }

    #[test]
    fn test_join_twice_keeps_single_row() {
        // テスト項目: 同じ Room に 2 回 join しても接続は 1 回だけ数えられる
        // given (前提条件):
        let tracker = RoomMembership::new();

        // when (操作):
        let first = tracker.join(&conn("c1"), &room("C1"));
        let second = tracker.join(&conn("c1"), &room("C1"));

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(tracker.members(&room("C1")), vec![conn("c1")]);
    }

    #[test]
    fn test_leave_unjoined_room_is_noop() {
        // テスト項目: join していない Room からの leave はエラーにならない
        // given (前提条件):
        let tracker = RoomMembership::new();
        tracker.join(&conn("c1"), &room("C1"));

        // when (操作):
        let unknown_room = tracker.leave(&conn("c1"), &room("C2"));
        let unknown_conn = tracker.leave(&conn("c2"), &room("C1"));

        // then (期待する結果):
        assert!(!unknown_room);
        assert!(!unknown_conn);
        assert_eq!(tracker.members(&room("C1")), vec![conn("c1")]);
    }

    #[test]
    fn test_room_disappears_when_last_connection_leaves() {
        // テスト項目: 最後の接続が leave すると Room は存在しなくなる
        // given (前提条件):
        let tracker = RoomMembership::new();
        tracker.join(&conn("c1"), &room("C1"));

        // when (操作):
        let removed = tracker.leave(&conn("c1"), &room("C1"));

        // then (期待する結果):
        assert!(removed);
        assert_eq!(tracker.room_count(), 0);
        assert!(tracker.rooms_of(&conn("c1")).is_empty());
    }

    #[test]
    fn test_drop_connection_removes_all_rows() {
        // テスト項目: 接続の切断で、その接続の全 Room の行が削除される
        // given (前提条件):
        let tracker = RoomMembership::new();
        tracker.join(&conn("c1"), &room("C1"));
        tracker.join(&conn("c1"), &room("C2"));
        tracker.join(&conn("c2"), &room("C1"));

        // when (操作):
        let left = tracker.drop_connection(&conn("c1"));

        // then (期待する結果):
        assert_eq!(left, vec![room("C1"), room("C2")]);
        assert_eq!(tracker.members(&room("C1")), vec![conn("c2")]);
        assert!(tracker.members(&room("C2")).is_empty());
        assert_eq!(tracker.room_count(), 1);
    }

    #[test]
    fn test_drop_unknown_connection() {
        // テスト項目: 未知の接続の切断は空の結果を返す
        // given (前提条件):
        let tracker = RoomMembership::new();

        // when (操作):
        let left = tracker.drop_connection(&conn("c1"));

        // then (期待する結果):
        assert!(left.is_empty());
    }
}
