//! ACTIVE 状態の接続が受け取ったイベントを各 UseCase へ振り分ける
//!
//! ## テスト作業記録
//!
//! - 各イベントが対応する UseCase に届き、結果が `Ack` に変換されることを確認
//! - 匿名接続の送信・既読・削除が `not_authenticated` になることを確認

use std::sync::Arc;

use crate::domain::{Ack, Connection, InboundEvent};

use super::{
    delete_message::DeleteMessageUseCase, mark_read::MarkReadUseCase,
    room_membership::RoomMembershipUseCase, send_message::SendMessageUseCase, typing::TypingUseCase,
};

pub struct EventDispatcher {
    rooms: Arc<RoomMembershipUseCase>,
    send_message: Arc<SendMessageUseCase>,
    typing: Arc<TypingUseCase>,
    mark_read: Arc<MarkReadUseCase>,
    delete_message: Arc<DeleteMessageUseCase>,
}

impl EventDispatcher {
    pub fn new(
        rooms: Arc<RoomMembershipUseCase>,
        send_message: Arc<SendMessageUseCase>,
        typing: Arc<TypingUseCase>,
        mark_read: Arc<MarkReadUseCase>,
        delete_message: Arc<DeleteMessageUseCase>,
    ) -> Self {
        Self {
            rooms,
            send_message,
            typing,
            mark_read,
            delete_message,
        }
    }

    /// イベントを処理し、要求元へ返す ack を組み立てる
    ///
    /// ack を返すかどうか（クライアントが ack ID を付けたか）は呼び出し側が判断する。
    pub async fn dispatch(&self, connection: &Connection, event: InboundEvent) -> Ack {
        let name = event.name();
        let ack = match event {
            InboundEvent::JoinRoom(room_id) => self.rooms.join(connection, room_id),
            InboundEvent::LeaveRoom(room_id) => self.rooms.leave(connection, room_id),
            InboundEvent::SendMessage(intent) => {
                match self
                    .send_message
                    .execute(connection.user_id(), intent)
                    .await
                {
                    Ok(view) => Ack::Sent {
                        message_id: view.message.id,
                        client_id: view.client_id,
                    },
                    Err(e) => Ack::Rejected(e.code()),
                }
            }
            InboundEvent::Typing(signal) => {
                self.typing.execute(connection, signal);
                Ack::Done
            }
            InboundEvent::MarkRead(receipt) => {
                match self
                    .mark_read
                    .execute(connection.user_id(), Some(connection.id()), receipt)
                    .await
                {
                    Ok(_) => Ack::Done,
                    Err(e) => Ack::Rejected(e.code()),
                }
            }
            InboundEvent::DeleteMessage(request) => {
                match self
                    .delete_message
                    .execute(connection.user_id(), request)
                    .await
                {
                    Ok(_) => Ack::Done,
                    Err(e) => Ack::Rejected(e.code()),
                }
            }
        };

        if let Ack::Rejected(code) = &ack {
            tracing::debug!(
                connection_id = %connection.id(),
                event = name,
                code = *code,
                "event rejected"
            );
        }
        ack
    }
}
