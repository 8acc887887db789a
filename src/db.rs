use anyhow::{Context, Result};
use directories::ProjectDirs;
use sqlx::{any::AnyConnectOptions, AnyPool, ConnectOptions, migrate::Migrator};
use sqlx::any::AnyPoolOptions;
use std::{path::PathBuf, str::FromStr};
use std::sync::Once;
use std::time::Duration;

use crate::storage::{current_epoch, TokenCache};

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

// Ensure drivers are installed exactly once for sqlx::any
static INSTALL_DRIVERS: Once = Once::new();

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed token cache.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
    token_ttl_secs: i64,
}

impl Database {
    // Create a connection pool. If database_url is None, use a SQLite file in
    // the user's data directory. TTL comes from KODIK_TOKEN_TTL_SECS.
    pub async fn connect(database_url: Option<&str>) -> Result<Self> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let url = match database_url {
            Some(u) if !u.trim().is_empty() => u.to_string(),
            _ => default_sqlite_url()?,
        };

        let opts = AnyConnectOptions::from_str(&url)
            .with_context(|| format!("invalid database URL: {url}"))?;
        // Quiet by default
        let opts = opts.disable_statement_logging();

        // Every connection to an in-memory database sees its own empty schema,
        // so that single connection must never be reaped
        let pool_opts = if url.contains(":memory:") {
            AnyPoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            AnyPoolOptions::new().max_connections(4)
        };
        let pool = pool_opts
            .connect_with(opts)
            .await
            .with_context(|| format!("failed to connect to database: {url}"))?;

        let token_ttl_secs = std::env::var("KODIK_TOKEN_TTL_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        tracing::debug!(%url, token_ttl_secs, "token cache database connected");
        Ok(Self { pool, token_ttl_secs })
    }

    pub fn with_token_ttl(mut self, secs: i64) -> Self { self.token_ttl_secs = secs; self }

    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.context("running migrations")
    }

    pub fn pool(&self) -> &AnyPool { &self.pool }

    /// Drop every remembered validation, or only those of one origin.
    pub async fn clear_api_tokens(&self, origin: Option<&str>) -> Result<u64> {
        let result = if let Some(o) = origin {
            sqlx::query("DELETE FROM api_tokens WHERE origin = ?")
                .bind(o.to_string())
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query("DELETE FROM api_tokens")
                .execute(&self.pool)
                .await?
        };
        Ok(result.rows_affected())
    }

    pub async fn count_api_tokens(&self) -> Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM api_tokens")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

#[async_trait::async_trait]
impl TokenCache for Database {
    async fn has_api_token(&self, token: &str, origin: &str) -> Result<bool> {
        let row = sqlx::query_scalar::<_, i64>(
            "SELECT expires_at FROM api_tokens WHERE token = ? AND origin = ? AND expires_at > ?",
        )
        .bind(token.to_string())
        .bind(origin.to_string())
        .bind(current_epoch())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn add_api_token(&self, token: &str, origin: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO api_tokens(token, origin, expires_at) VALUES (?, ?, ?)\n             ON CONFLICT(token, origin) DO UPDATE SET expires_at=excluded.expires_at",
        )
        .bind(token.to_string())
        .bind(origin.to_string())
        .bind(current_epoch() + self.token_ttl_secs)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn default_sqlite_url() -> Result<String> {
    let proj = ProjectDirs::from("dev", "kodik", "kodik")
        .context("unable to determine data directory for default sqlite path")?;
    let mut path: PathBuf = proj.data_dir().to_path_buf();
    std::fs::create_dir_all(&path).with_context(|| format!("creating data dir: {}", path.display()))?;
    path.push("kodik.db");
    Ok(sqlite_url_for(&path))
}

/// `sqlite://` URL that creates the file on first use.
pub fn sqlite_url_for(path: &std::path::Path) -> String {
    // Encode spaces in the path for a valid sqlite URL
    let path_str = path.to_string_lossy().replace(' ', "%20");
    format!("sqlite://{path_str}?mode=rwc")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let url = sqlite_url_for(&dir.path().join("tokens.db"));
        let db = Database::connect(Some(&url)).await.unwrap().with_token_ttl(3600);
        db.run_migrations().await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn add_then_has() {
        let (_dir, db) = temp_db().await;
        assert!(!db.has_api_token("t", "kodik").await.unwrap());
        db.add_api_token("t", "kodik").await.unwrap();
        assert!(db.has_api_token("t", "kodik").await.unwrap());
        assert!(!db.has_api_token("t", "mirror").await.unwrap());
    }

    #[tokio::test]
    async fn writes_are_idempotent() {
        let (_dir, db) = temp_db().await;
        db.add_api_token("t", "kodik").await.unwrap();
        db.add_api_token("t", "kodik").await.unwrap();
        assert_eq!(db.count_api_tokens().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn expired_validation_is_a_miss() {
        let (_dir, db) = temp_db().await;
        let db = db.with_token_ttl(-10);
        db.add_api_token("t", "kodik").await.unwrap();
        assert!(!db.has_api_token("t", "kodik").await.unwrap());
    }

    #[tokio::test]
    async fn clear_by_origin() {
        let (_dir, db) = temp_db().await;
        db.add_api_token("t", "kodik").await.unwrap();
        db.add_api_token("t", "mirror").await.unwrap();
        assert_eq!(db.clear_api_tokens(Some("mirror")).await.unwrap(), 1);
        assert!(db.has_api_token("t", "kodik").await.unwrap());
        assert_eq!(db.clear_api_tokens(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn in_memory_database_keeps_schema() {
        let db = Database::connect(Some("sqlite::memory:")).await.unwrap();
        db.run_migrations().await.unwrap();
        db.add_api_token("t", "kodik").await.unwrap();
        assert!(db.has_api_token("t", "kodik").await.unwrap());

        let options = db.pool().options();
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }

    #[tokio::test]
    async fn file_database_keeps_default_reaping() {
        let (_dir, db) = temp_db().await;
        assert_eq!(db.pool().options().get_max_connections(), 4);
        assert!(db.pool().options().get_idle_timeout().is_some());
    }
}
