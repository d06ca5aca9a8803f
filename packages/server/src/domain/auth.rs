//! 認証情報の検証インターフェース
//!
//! トークンの発行やパスワード検証は外部の責務。ここではベアラー認証情報から
//! ユーザー ID を取り出すことだけを扱う。

use super::{error::AuthError, value_object::UserId};

#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<UserId, AuthError>;
}
