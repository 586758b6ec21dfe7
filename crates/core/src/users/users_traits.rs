use async_trait::async_trait;

use super::users_model::UserInfo;
use crate::errors::Result;

/// Trait for reading the signed-in user's profile
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn get_current_user(&self) -> Result<UserInfo>;
}
