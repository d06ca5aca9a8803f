//! Presence Registry
//!
//! ユーザー ID から生存中の接続 ID 集合へのプロセス内マッピング。
//!
//! - 接続集合が空になったエントリは即座に削除する（墓標を残さない）
//! - オンラインユーザー一覧はエントリのキーを列挙して得る
//!
//! 全操作は同期的で、ロックを保持したまま await することはない。

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Mutex,
};

use super::value_object::{ConnectionId, UserId};

#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: Mutex<BTreeMap<UserId, BTreeSet<ConnectionId>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続を追加する。既に登録済みなら何もしない
    ///
    /// # Returns
    ///
    /// このユーザーが新たにオンラインになった場合 `true`
    pub fn add_connection(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get_mut(user_id) {
            Some(connections) => {
                connections.insert(connection_id);
                false
            }
            None => {
                entries.insert(user_id.clone(), BTreeSet::from([connection_id]));
                true
            }
        }
    }

    /// 接続を削除する。最後の接続だった場合はエントリごと削除する
    ///
    /// # Returns
    ///
    /// このユーザーがオフラインになった場合 `true`
    pub fn remove_connection(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let Some(connections) = entries.get_mut(user_id) else {
            return false;
        };
        connections.remove(connection_id);
        if connections.is_empty() {
            entries.remove(user_id);
            true
        } else {
            false
        }
    }

    /// ユーザーの接続一覧。未知のユーザーは空集合
    pub fn list_connections(&self, user_id: &UserId) -> BTreeSet<ConnectionId> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(user_id).cloned().unwrap_or_default()
    }

    /// オンラインユーザー一覧（昇順）
    pub fn list_online_users(&self) -> Vec<UserId> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.keys().cloned().collect()
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(user_id)
    }
}
