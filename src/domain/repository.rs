use crate::domain::user::{NewUser, User, UserPatch};
use anyhow::Result;
use async_trait::async_trait;

// One method per statement the endpoints issue. insert returns the generated
// id; update and delete report the affected-row count.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<User>>;

    async fn insert(&self, user: NewUser) -> Result<i64>;

    async fn update(&self, id: i64, patch: UserPatch) -> Result<u64>;

    async fn delete(&self, id: i64) -> Result<u64>;
}
