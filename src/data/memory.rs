use crate::domain::repository::UserRepository;
use crate::domain::user::{NewUser, User, UserPatch};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

// Mirrors the table semantics the postgres implementation relies on (ids
// sequential from 1, id-ordered listing) so the HTTP tests can run without a
// live datastore.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    rows: Arc<RwLock<BTreeMap<i64, User>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<User>> {
        let rows = self.rows.read().await;
        Ok(rows.values().cloned().collect())
    }

    #[instrument(skip(self, user), fields(name = %user.name, email = %user.email))]
    async fn insert(&self, user: NewUser) -> Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.write().await;
        rows.insert(
            id,
            User {
                id,
                name: user.name,
                email: user.email,
            },
        );
        debug!(user_id = id, "User inserted into memory store");
        Ok(id)
    }

    #[instrument(skip(self, patch), fields(user_id = id))]
    async fn update(&self, id: i64, patch: UserPatch) -> Result<u64> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(user) => {
                if let Some(name) = patch.name {
                    user.name = name;
                }
                if let Some(email) = patch.email {
                    user.email = email;
                }
                debug!(user_id = id, "User updated in memory store");
                Ok(1)
            }
            None => {
                trace!(user_id = id, "No row matched update");
                Ok(0)
            }
        }
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn delete(&self, id: i64) -> Result<u64> {
        let mut rows = self.rows.write().await;
        let removed = rows.remove(&id).is_some();
        debug!(user_id = id, removed = removed, "Delete applied");
        Ok(u64::from(removed))
    }
}
