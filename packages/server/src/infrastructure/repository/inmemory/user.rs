//! InMemory User Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, UserId, UserProfile, UserRepository};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期データ付きで作成
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let users = profiles
            .into_iter()
            .map(|profile| (profile.id.clone(), profile))
            .collect();
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.get(id).cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn upsert(&self, profile: UserProfile) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().await;
        users.insert(profile.id.clone(), profile);
        Ok(())
    }
}
