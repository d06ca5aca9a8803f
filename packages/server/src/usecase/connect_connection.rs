//! UseCase: 接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectConnectionUseCase::execute() メソッド
//! - 認証 → Presence 登録 → ACTIVE 遷移 → オンラインユーザー一覧の配信
//!
//! ### なぜこのテストが必要か
//! - 認証情報がない・不正な場合でも接続が拒否されず匿名になることを保証
//! - 匿名接続が Presence に登録されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効な認証情報での接続
//! - 異常系：認証情報なし・検証失敗（匿名として続行）
//! - エッジケース：同じユーザーの 2 本目の接続

use std::sync::Arc;

use crate::domain::{
    AuthError, Connection, ConnectionId, CredentialVerifier, EventNotifier, MessagePusher,
    NotifyTarget, OutboundEvent, PresenceRegistry, PusherChannel, TransitionError,
};

/// 接続のユースケース
pub struct ConnectConnectionUseCase {
    verifier: Arc<dyn CredentialVerifier>,
    presence: Arc<PresenceRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    notifier: Arc<dyn EventNotifier>,
}

impl ConnectConnectionUseCase {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        presence: Arc<PresenceRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        notifier: Arc<dyn EventNotifier>,
    ) -> Self {
        Self {
            verifier,
            presence,
            message_pusher,
            notifier,
        }
    }

    /// 接続を ACTIVE にする
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 新しい接続の ID
    /// * `credential` - ハンドシェイクで渡されたベアラー認証情報（任意）
    /// * `sender` - この接続へのフレーム送信用チャンネル
    ///
    /// # Returns
    ///
    /// ACTIVE 状態の `Connection`
    pub fn execute(
        &self,
        connection_id: ConnectionId,
        credential: Option<&str>,
        sender: PusherChannel,
    ) -> Result<Connection, TransitionError> {
        let mut connection = Connection::new(connection_id);

        // 1. 認証（1 回だけ。失敗しても匿名として続行）
        let verified = match credential {
            Some(credential) => self.verifier.verify(credential),
            None => Err(AuthError::Missing),
        };
        if let Err(e) = &verified
            && *e != AuthError::Missing
        {
            tracing::warn!(
                connection_id = %connection.id(),
                "credential rejected, continuing as anonymous: {}",
                e
            );
        }
        connection.authenticate(verified)?;

        // 2. 送信チャンネルを登録
        self.message_pusher
            .register_connection(connection.id().clone(), sender);

        // 3. Presence に登録（匿名は登録しない）
        let connection_id = connection.id().clone();
        if let Some(user_id) = connection.user_id()
            && self.presence.add_connection(user_id, connection_id)
        {
            tracing::info!(user_id = %user_id, "user is now online");
        }

        // 4. ACTIVE に遷移し、オンラインユーザー一覧を全接続に配信
        connection.activate()?;
        self.notifier.notify(
            NotifyTarget::Everyone,
            &OutboundEvent::OnlineUsers(self.presence.list_online_users()),
        );

        tracing::info!(
            connection_id = %connection.id(),
            user_id = connection.user_id().map(|u| u.as_str()).unwrap_or("-"),
            "connection active"
        );
        Ok(connection)
    }
}
