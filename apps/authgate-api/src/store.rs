//! SQLite-backed credential store

use std::time::Duration;

use async_trait::async_trait;
use authgate_core::{CredentialStore, StoreError};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the pool and make sure the schema exists
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        tracing::info!("Connecting to credential store: {}", database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }
}

/// Sort a driver error into the store taxonomy
fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
        sqlx::Error::Database(db) if db.code().is_some_and(|code| is_busy_code(&code)) => {
            StoreError::Transient(err.to_string())
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Transient(err.to_string())
        }
        _ => StoreError::Fatal(err.to_string()),
    }
}

/// SQLITE_BUSY (5) and SQLITE_LOCKED (6), including their extended codes
fn is_busy_code(code: &str) -> bool {
    code.parse::<i32>()
        .map(|code| matches!(code & 0xff, 5 | 6))
        .unwrap_or(false)
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn put(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        Ok(())
    }

    async fn get(&self, username: &str) -> Result<String, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?
            .ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use sqlx::sqlite::SqliteConnectOptions;

    use super::*;

    async fn memory_store() -> SqliteStore {
        // A single connection, since every in-memory connection is its own database
        SqliteStore::connect("sqlite::memory:", 1, Duration::from_secs(1))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = memory_store().await;
        store.put("alice", "$argon2id$fake").await.unwrap();

        assert_eq!(store.get("alice").await.unwrap(), "$argon2id$fake");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = memory_store().await;
        assert!(matches!(
            store.get("nobody").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = memory_store().await;
        store.put("alice", "first").await.unwrap();

        assert!(matches!(
            store.put("alice", "second").await,
            Err(StoreError::Conflict)
        ));
        assert_eq!(store.get("alice").await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let store = memory_store().await;
        store.put("alice", "lower").await.unwrap();
        store.put("Alice", "upper").await.unwrap();

        assert_eq!(store.get("Alice").await.unwrap(), "upper");
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let store = memory_store().await;
        store.run_migrations().await.unwrap();
        assert!(store.ping().await.is_ok());
    }

    #[test]
    fn test_busy_and_locked_codes_are_retryable() {
        // SQLITE_BUSY, SQLITE_LOCKED, SQLITE_BUSY_SNAPSHOT, SQLITE_LOCKED_SHAREDCACHE
        for code in ["5", "6", "517", "262"] {
            assert!(is_busy_code(code), "{code} should be retryable");
        }
        // SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CORRUPT, non-numeric
        for code in ["1555", "11", "XX000"] {
            assert!(!is_busy_code(code), "{code} should not be retryable");
        }
    }

    #[tokio::test]
    async fn test_locked_database_is_transient() {
        let path = std::env::temp_dir().join(format!("authgate-locked-{}.db", std::process::id()));
        let url = format!("sqlite:{}?mode=rwc", path.display());
        let _ = std::fs::remove_file(&path);

        let writer = SqliteStore::connect(&url, 1, Duration::from_secs(1)).await.unwrap();

        let options = SqliteConnectOptions::from_str(&url)
            .unwrap()
            .busy_timeout(Duration::ZERO);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        let blocked = SqliteStore { pool };

        let mut lock = writer.pool.acquire().await.unwrap();
        sqlx::query("BEGIN EXCLUSIVE").execute(&mut *lock).await.unwrap();

        assert!(matches!(
            blocked.put("alice", "hash").await,
            Err(StoreError::Transient(_))
        ));

        sqlx::query("ROLLBACK").execute(&mut *lock).await.unwrap();
        drop(lock);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_closed_pool_is_transient() {
        let store = memory_store().await;
        store.pool.close().await;

        assert!(matches!(
            store.get("alice").await,
            Err(StoreError::Transient(_))
        ));
    }
}
