use crate::domain::repository::UserRepository;
use crate::domain::user::{NewUser, User, UserPatch};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, instrument};

// Expects `users(id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL, email TEXT NOT NULL)`
// to already exist; provisioning the table is an external setup concern.
pub async fn init_pool(url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await
        .context("failed to connect to postgres")?;
    Ok(pool)
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Placeholders are numbered in field order with the id filter last; the binds
// in `update` must follow the same order.
fn update_statement(patch: &UserPatch) -> String {
    let mut clauses = Vec::new();
    let mut placeholder = 1;
    if patch.name.is_some() {
        clauses.push(format!("name = ${placeholder}"));
        placeholder += 1;
    }
    if patch.email.is_some() {
        clauses.push(format!("email = ${placeholder}"));
        placeholder += 1;
    }
    format!(
        "UPDATE users SET {} WHERE id = ${placeholder}",
        clauses.join(", ")
    )
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    #[instrument(skip(self, user), fields(name = %user.name, email = %user.email))]
    async fn insert(&self, user: NewUser) -> Result<i64> {
        let id: i64 =
            sqlx::query_scalar("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id")
                .bind(&user.name)
                .bind(&user.email)
                .fetch_one(&self.pool)
                .await?;
        debug!(user_id = id, "Inserted user");
        Ok(id)
    }

    #[instrument(skip(self, patch), fields(user_id = id))]
    async fn update(&self, id: i64, patch: UserPatch) -> Result<u64> {
        let sql = update_statement(&patch);
        let mut query = sqlx::query(&sql);
        if let Some(name) = &patch.name {
            query = query.bind(name);
        }
        if let Some(email) = &patch.email {
            query = query.bind(email);
        }
        let result = query.bind(id).execute(&self.pool).await?;
        debug!(user_id = id, rows = result.rows_affected(), "Updated user");
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(user_id = id, rows = result.rows_affected(), "Deleted user");
        Ok(result.rows_affected())
    }
}
