//! 接続ライフサイクルの状態機械
//!
//! ```text
//! CONNECTING ──authenticate──▶ AUTHENTICATED ─┐
//!      │                                      ├─activate─▶ ACTIVE ──close──▶ CLOSED
//!      └──────(認証情報なし・不正)──▶ ANONYMOUS ─┘
//! ```
//!
//! 認証は接続時に 1 回だけ行う。認証情報の欠落・不正で接続を拒否することはなく、
//! 匿名接続はユーザー ID を必要とする操作の時点で拒否される。

use super::{
    error::{AuthError, TransitionError},
    value_object::{ConnectionId, UserId},
};

/// 接続の主体
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User(UserId),
    Anonymous,
}

impl Identity {
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::User(user_id) => Some(user_id),
            Identity::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Authenticated,
    Anonymous,
    Active,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Authenticated => "authenticated",
            ConnectionState::Anonymous => "anonymous",
            ConnectionState::Active => "active",
            ConnectionState::Closed => "closed",
        }
    }
}

/// 1 本の接続
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    state: ConnectionState,
    identity: Identity,
}

impl Connection {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            state: ConnectionState::Connecting,
            identity: Identity::Anonymous,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.identity.user_id()
    }

    /// 認証結果を適用する。失敗した場合は匿名になる
    pub fn authenticate(
        &mut self,
        verified: Result<UserId, AuthError>,
    ) -> Result<&Identity, TransitionError> {
        self.expect_state(ConnectionState::Connecting, "authenticate")?;
        match verified {
            Ok(user_id) => {
                self.identity = Identity::User(user_id);
                self.state = ConnectionState::Authenticated;
            }
            Err(_) => {
                self.identity = Identity::Anonymous;
                self.state = ConnectionState::Anonymous;
            }
        }
        Ok(&self.identity)
    }

    pub fn activate(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ConnectionState::Authenticated | ConnectionState::Anonymous => {
                self.state = ConnectionState::Active;
                Ok(())
            }
            other => Err(TransitionError {
                from: other.as_str(),
                action: "activate",
            }),
        }
    }

    /// どの状態からでも閉じられる（二重に閉じることはできない）
    pub fn close(&mut self) -> Result<ConnectionState, TransitionError> {
        if self.state == ConnectionState::Closed {
            return Err(TransitionError {
                from: self.state.as_str(),
                action: "close",
            });
        }
        let previous = self.state;
        self.state = ConnectionState::Closed;
        Ok(previous)
    }

    pub fn is_active(&self) -> bool {
        self.state == ConnectionState::Active
    }

    fn expect_state(
        &self,
        expected: ConnectionState,
        action: &'static str,
    ) -> Result<(), TransitionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(TransitionError {
                from: self.state.as_str(),
                action,
            })
        }
    }
}
