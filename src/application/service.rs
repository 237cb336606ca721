use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{NewUser, User, UserPatch};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Drives the four user operations over the repository seam. Each call maps
/// to exactly one statement; there is no cross-call coordination.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.repository.list().await
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let id = self.repository.insert(new_user.clone()).await?;
        info!(user_id = id, "User created");
        Ok(User {
            id,
            name: new_user.name,
            email: new_user.email,
        })
    }

    /// Applies the patch. A patch whose id matches no row still counts as
    /// success; of the two mutating endpoints only delete inspects the
    /// affected-row count.
    pub async fn update_user(&self, id: i64, patch: UserPatch) -> Result<()> {
        let rows = self.repository.update(id, patch).await?;
        if rows == 0 {
            warn!(user_id = id, "Update matched no rows");
        } else {
            info!(user_id = id, "User updated");
        }
        Ok(())
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        let rows = self.repository.delete(id).await?;
        if rows == 0 {
            return Err(DomainError::UserNotFound.into());
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryUserRepository;

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::new(Arc::new(InMemoryUserRepository::new()))
    }

    fn ann() -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
        }
    }

    #[tokio::test]
    async fn create_returns_the_stored_row() {
        let service = service();

        let user = service.create_user(ann()).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.name, "Ann");
        assert_eq!(service.list_users().await.unwrap(), vec![user]);
    }

    #[tokio::test]
    async fn update_of_unknown_id_still_succeeds() {
        let service = service();

        let result = service
            .update_user(
                99,
                UserPatch {
                    name: Some("Ghost".to_string()),
                    email: None,
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_user_not_found() {
        let service = service();

        let err = service.delete_user(99).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let service = service();
        let user = service.create_user(ann()).await.unwrap();

        service.delete_user(user.id).await.unwrap();

        assert!(service.list_users().await.unwrap().is_empty());
    }
}
