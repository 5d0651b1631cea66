use std::{fs, io, path::Path, str::FromStr, time::Duration};

use async_trait::async_trait;
use bcrypt::hash;
use serde::Deserialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    FromRow,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::OperatingMode;
use crate::models::{User, Venue};

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    email TEXT
)";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to read seed file: {0}")]
    Io(#[from] io::Error),

    #[error("malformed seed file: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("failed to hash seed password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Access to the users table.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Bound-parameter lookup; the username is never spliced into query text.
    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn update_user_email(&self, username: &str, email: &str) -> Result<(), StoreError>;

    /// Executes `sql` exactly as given and maps every returned row to a user.
    async fn query_users(&self, sql: &str) -> Result<Vec<User>, StoreError>;
}

/// Users table on SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` and ensures the
    /// users table exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to an in-memory database gets its own copy, so
        // keep exactly one alive for the life of the pool.
        let pool_options = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options.connect_with(options).await?;
        sqlx::query(CREATE_USERS).execute(&pool).await?;
        info!(url, "users database ready");

        Ok(Self { pool })
    }

    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }

    /// Inserts a user, overwriting password and email of an existing row
    /// with the same username. The row keeps its position.
    #[cfg(test)]
    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (username, password, email) VALUES (?, ?, ?)
             ON CONFLICT(username) DO UPDATE SET password = excluded.password, email = excluded.email",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Overwrites the stored password column. Returns whether the user existed.
    #[cfg(test)]
    pub async fn set_password(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE username = ?")
            .bind(password)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[cfg(test)]
    pub async fn remove_user(&self, username: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Adds seed users that are not in the table yet, hashing their
    /// passwords in safe mode and keeping them as plaintext in unsafe mode.
    pub async fn seed(
        &self,
        seeds: Vec<SeedUser>,
        mode: OperatingMode,
        cost: u32,
    ) -> Result<(), StoreError> {
        for seed in seeds {
            let password = match mode {
                OperatingMode::Safe => hash(&seed.password, cost)?,
                OperatingMode::Unsafe => seed.password,
            };
            let result = sqlx::query(
                "INSERT OR IGNORE INTO users (username, password, email) VALUES (?, ?, ?)",
            )
            .bind(&seed.username)
            .bind(&password)
            .bind(&seed.email)
            .execute(&self.pool)
            .await?;
            if result.rows_affected() == 0 {
                debug!(username = %seed.username, "seed user already present");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, password, email FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user_email(&self, username: &str, email: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET email = ? WHERE username = ?")
            .bind(email)
            .bind(username)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            debug!(username, "email update matched no rows");
        }
        Ok(())
    }

    async fn query_users(&self, sql: &str) -> Result<Vec<User>, StoreError> {
        // Ad-hoc text, so keep it out of the prepared statement cache.
        let rows = sqlx::query(sql)
            .persistent(false)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(User::from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Reads a JSON array from `path`. A missing file yields an empty list.
fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, StoreError> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let items: Vec<T> = serde_json::from_str(&raw)?;
            info!(path = %path.display(), count = items.len(), "loaded seed file");
            Ok(items)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "seed file not found, starting empty");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn load_seed_users(path: impl AsRef<Path>) -> Result<Vec<SeedUser>, StoreError> {
    load_json(path.as_ref())
}

pub fn load_venues(path: impl AsRef<Path>) -> Result<Vec<Venue>, StoreError> {
    load_json(path.as_ref())
}
