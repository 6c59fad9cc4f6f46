//! Postgres-backed user store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed / other | N/A | `Database` |
//!
//! All statements are parameterized. Ids are read as `BIGINT` so tables
//! created with a plain `SERIAL` column work unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use roleguard_auth::Role;
use roleguard_core::UserId;

use super::{NewUser, StoreError, UserRecord, UserStore, UserSummary};

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT
)
"#;

/// Postgres user store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and make sure the `users` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_users_table", e))?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id::BIGINT AS id, username, password, role
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_username", e))?;

        row.map(|row| {
            Ok(UserRecord {
                id: UserId::new(get(&row, "id")?),
                username: get(&row, "username")?,
                password_hash: get(&row, "password")?,
                role: role_from_row(&row)?,
            })
        })
        .transpose()
    }

    #[instrument(skip(self, user), fields(username = %user.username), err)]
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password, role)
            VALUES ($1, $2, $3)
            RETURNING id::BIGINT AS id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        Ok(UserRecord {
            id: UserId::new(get(&row, "id")?),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
        })
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<UserSummary>, StoreError> {
        let rows = sqlx::query("SELECT id::BIGINT AS id, username, role FROM users ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        rows.iter().map(summary_from_row).collect()
    }

    #[instrument(skip(self), fields(user_id = %id, role = %role), err)]
    async fn update_role(&self, id: UserId, role: &Role) -> Result<Option<UserSummary>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE users SET role = $1
            WHERE id = $2
            RETURNING id::BIGINT AS id, username, role
            "#,
        )
        .bind(role.as_str())
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_role", e))?;

        row.as_ref().map(summary_from_row).transpose()
    }
}

fn summary_from_row(row: &sqlx::postgres::PgRow) -> Result<UserSummary, StoreError> {
    Ok(UserSummary {
        id: UserId::new(get(row, "id")?),
        username: get(row, "username")?,
        role: role_from_row(row)?,
    })
}

// Rows inserted by older deployments may carry a NULL role.
fn role_from_row(row: &sqlx::postgres::PgRow) -> Result<Role, StoreError> {
    let role: Option<String> = get(row, "role")?;
    Ok(Role::from(role.unwrap_or_default()))
}

fn get<'r, T>(row: &'r sqlx::postgres::PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Database(format!("failed to read column '{column}': {e}")))
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}
