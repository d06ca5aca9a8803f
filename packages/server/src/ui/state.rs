//! Shared application state.

use std::sync::Arc;

use hanashi_shared::time::Clock;

use crate::{
    domain::{
        ChatRepository, CredentialVerifier, EventNotifier, MessagePusher, MessageRepository,
        PresenceRegistry, RoomMembership, UserRepository,
    },
    infrastructure::{FanoutRouter, message_pusher::WebSocketMessagePusher},
    usecase::{
        AccessChatUseCase, ConnectConnectionUseCase, DeleteChatUseCase, DeleteMessageUseCase,
        DisconnectConnectionUseCase, EventDispatcher, FetchChatsUseCase, GetMessagesUseCase,
        ManageGroupUseCase, MarkReadUseCase, RoomMembershipUseCase, SendMessageUseCase,
        TypingUseCase,
    },
};

/// 永続化ストアの組
#[derive(Clone)]
pub struct Stores {
    pub chats: Arc<dyn ChatRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub users: Arc<dyn UserRepository>,
}

/// Shared application state
pub struct AppState {
    /// Presence Registry（オンライン状態の唯一の正）
    pub presence: Arc<PresenceRegistry>,
    /// MessagePusher（接続ごとの送信チャンネル）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// CredentialVerifier（HTTP の Authorization ヘッダー検証にも使う）
    pub verifier: Arc<dyn CredentialVerifier>,
    pub connect_connection_usecase: Arc<ConnectConnectionUseCase>,
    pub disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
    /// WebSocket の受信イベント振り分け
    pub dispatcher: Arc<EventDispatcher>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub mark_read_usecase: Arc<MarkReadUseCase>,
    pub delete_message_usecase: Arc<DeleteMessageUseCase>,
    pub access_chat_usecase: Arc<AccessChatUseCase>,
    pub manage_group_usecase: Arc<ManageGroupUseCase>,
    pub delete_chat_usecase: Arc<DeleteChatUseCase>,
    pub fetch_chats_usecase: Arc<FetchChatsUseCase>,
    pub get_messages_usecase: Arc<GetMessagesUseCase>,
}

impl AppState {
    /// ストア・認証・時計から全 UseCase を組み立てる
    ///
    /// Presence Registry と Room Tracker はプロセス内に 1 つずつ作られ、
    /// ファンアウトはこのプロセスに接続しているクライアントにのみ届く。
    pub fn build(
        stores: Stores,
        verifier: Arc<dyn CredentialVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let Stores {
            chats,
            messages,
            users,
        } = stores;

        // 1. インメモリ状態
        let presence = Arc::new(PresenceRegistry::new());
        let rooms = Arc::new(RoomMembership::new());
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());

        // 2. Fanout Router
        let notifier: Arc<dyn EventNotifier> = Arc::new(FanoutRouter::new(
            presence.clone(),
            rooms.clone(),
            message_pusher.clone(),
        ));

        // 3. UseCases
        let connect_connection_usecase = Arc::new(ConnectConnectionUseCase::new(
            verifier.clone(),
            presence.clone(),
            message_pusher.clone(),
            notifier.clone(),
        ));
        let disconnect_connection_usecase = Arc::new(DisconnectConnectionUseCase::new(
            presence.clone(),
            rooms.clone(),
            message_pusher.clone(),
            notifier.clone(),
        ));
        let send_message_usecase = Arc::new(SendMessageUseCase::new(
            chats.clone(),
            messages.clone(),
            users.clone(),
            notifier.clone(),
            clock.clone(),
        ));
        let mark_read_usecase = Arc::new(MarkReadUseCase::new(messages.clone(), notifier.clone()));
        let delete_message_usecase = Arc::new(DeleteMessageUseCase::new(
            chats.clone(),
            messages.clone(),
            notifier.clone(),
            clock.clone(),
        ));
        let dispatcher = Arc::new(EventDispatcher::new(
            Arc::new(RoomMembershipUseCase::new(rooms)),
            send_message_usecase.clone(),
            Arc::new(TypingUseCase::new(notifier.clone())),
            mark_read_usecase.clone(),
            delete_message_usecase.clone(),
        ));
        let access_chat_usecase = Arc::new(AccessChatUseCase::new(
            chats.clone(),
            users.clone(),
            clock.clone(),
        ));
        let manage_group_usecase = Arc::new(ManageGroupUseCase::new(
            chats.clone(),
            messages.clone(),
            users.clone(),
            notifier,
            clock,
        ));
        let delete_chat_usecase = Arc::new(DeleteChatUseCase::new(chats.clone(), messages.clone()));
        let fetch_chats_usecase = Arc::new(FetchChatsUseCase::new(chats.clone(), users.clone()));
        let get_messages_usecase = Arc::new(GetMessagesUseCase::new(chats, messages, users));

        Self {
            presence,
            message_pusher,
            verifier,
            connect_connection_usecase,
            disconnect_connection_usecase,
            dispatcher,
            send_message_usecase,
            mark_read_usecase,
            delete_message_usecase,
            access_chat_usecase,
            manage_group_usecase,
            delete_chat_usecase,
            fetch_chats_usecase,
            get_messages_usecase,
        }
    }
}
