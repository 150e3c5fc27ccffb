use async_trait::async_trait;
use uuid::Uuid;

use super::models::User;
use crate::Result;

/// User and interest persistence behind the auth and profile endpoints.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DatabaseError::Duplicate` when the email is taken.
    async fn create_user(&self, user: &User) -> Result<User>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_interests(&self, user_id: Uuid) -> Result<Vec<String>>;

    /// Swaps the whole interest set in one step.
    async fn replace_interests(&self, user_id: Uuid, labels: &[String]) -> Result<()>;
}
