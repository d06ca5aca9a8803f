//! 送信イベント通知のインターフェース
//!
//! UseCase 層は永続化の後にこの trait を通じてイベントを通知する。
//! 具体的な配送（Room / ユーザー / 接続への展開）は Infrastructure 層のルーターが担う。

use super::{
    event::OutboundEvent,
    value_object::{ConnectionId, RoomId, UserId},
};

/// 通知先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyTarget {
    /// Room に join している全接続
    Room(RoomId),
    /// Room に join している接続のうち、指定した接続以外
    RoomExcept { room: RoomId, except: ConnectionId },
    /// ユーザーの全接続（Room 参加状況に関係なく）
    User(UserId),
    /// 単一の接続
    Connection(ConnectionId),
    /// 生存中の全接続（匿名接続を含む）
    Everyone,
}

/// EventNotifier trait
///
/// 配送は fire-and-forget。失敗や到達不能な接続は呼び出し元に返さない。
#[cfg_attr(test, mockall::automock)]
pub trait EventNotifier: Send + Sync {
    fn notify(&self, target: NotifyTarget, event: &OutboundEvent);
}
