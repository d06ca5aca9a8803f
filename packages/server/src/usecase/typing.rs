//! UseCase: 入力中シグナルの中継
//!
//! 永続化を伴わない一時的なイベント。送信元の接続を除いた Room の接続へ中継する。

use std::sync::Arc;

use crate::domain::{Connection, EventNotifier, NotifyTarget, OutboundEvent, RoomId, TypingSignal};

pub struct TypingUseCase {
    notifier: Arc<dyn EventNotifier>,
}

impl TypingUseCase {
    pub fn new(notifier: Arc<dyn EventNotifier>) -> Self {
        Self { notifier }
    }

    /// チャット ID がなければ何もせず `false`
    pub fn execute(&self, origin: &Connection, signal: TypingSignal) -> bool {
        let Some(chat_id) = signal.chat_id else {
            tracing::debug!(connection_id = %origin.id(), "typing signal without chatId dropped");
            return false;
        };
        let target = NotifyTarget::RoomExcept {
            room: RoomId::from(&chat_id),
            except: origin.id().clone(),
        };
        self.notifier.notify(
            target,
            &OutboundEvent::Typing {
                chat_id,
                user_id: origin.user_id().cloned(),
                is_typing: signal.is_typing,
            },
        );
        true
    }
}
