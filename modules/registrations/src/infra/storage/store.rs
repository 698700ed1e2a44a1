//! Store bootstrap: DSN composition, connection, liveness probe and
//! collection setup. Any failure here is fatal for the process.

use std::path::PathBuf;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::StoreConfig;
use crate::infra::storage::sea_orm_repo::SeaOrmRegistrationsRepository;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection string is not configured")]
    MissingConnectionString,

    #[error("store database name is not configured")]
    MissingDatabaseName,

    #[error("store collection name must be a non-empty identifier, got '{0}'")]
    InvalidCollectionName(String),

    #[error("unsupported store scheme '{0}' (expected sqlite or postgres)")]
    UnsupportedScheme(String),

    #[error("invalid store connection string: {0}")]
    InvalidConnectionString(String),

    #[error("failed to create store directory '{path}': {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store unavailable at {dsn}: {source}")]
    Unavailable {
        dsn: String,
        #[source]
        source: DbErr,
    },

    #[error("failed to prepare collection '{collection}': {source}")]
    Collection {
        collection: String,
        #[source]
        source: DbErr,
    },
}

/// Compose the driver DSN from the connection string and the database name.
///
/// - `sqlite::memory:` stays in memory (the database name is still required).
/// - `sqlite://<dir>` becomes `sqlite://<dir>/<database>.sqlite?mode=rwc`.
/// - `postgres://…` gets `/<database>` as its path.
pub fn build_dsn(cfg: &StoreConfig) -> Result<String, StoreError> {
    let conn = cfg
        .connection_string
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(StoreError::MissingConnectionString)?;
    let database = cfg
        .database_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(StoreError::MissingDatabaseName)?;

    if let Some(rest) = conn.strip_prefix("sqlite:") {
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        if rest == ":memory:" {
            return Ok("sqlite::memory:".to_string());
        }
        if rest.is_empty() {
            return Err(StoreError::InvalidConnectionString(conn.to_string()));
        }
        let dir = PathBuf::from(rest.split('?').next().unwrap_or(rest));
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Directory {
            path: dir.clone(),
            source,
        })?;
        let file = dir.join(format!("{database}.sqlite"));
        return Ok(format!("sqlite://{}?mode=rwc", file.to_string_lossy()));
    }

    let mut url =
        Url::parse(conn).map_err(|e| StoreError::InvalidConnectionString(e.to_string()))?;
    match url.scheme() {
        "postgres" | "postgresql" => {
            url.set_path(&format!("/{database}"));
            Ok(url.to_string())
        }
        other => Err(StoreError::UnsupportedScheme(other.to_string())),
    }
}

/// DSN with the password masked, for logs and error messages.
pub fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => dsn.to_string(),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Connect, ping and prepare the collection. Returns a ready repository
/// sharing one connection pool for the lifetime of the process.
pub async fn open(
    cfg: &StoreConfig,
) -> Result<SeaOrmRegistrationsRepository<DatabaseConnection>, StoreError> {
    if !is_identifier(&cfg.collection_name) {
        return Err(StoreError::InvalidCollectionName(
            cfg.collection_name.clone(),
        ));
    }

    let dsn = build_dsn(cfg)?;
    let shown = redact_dsn(&dsn);
    info!(dsn = %shown, collection = %cfg.collection_name, "Connecting to registration store");

    let timeout = Duration::from_secs(cfg.connect_timeout_sec.max(1));
    let mut opts = ConnectOptions::new(dsn.clone());
    opts.connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(false);
    if dsn.contains(":memory:") {
        // every pooled connection to :memory: would otherwise see its own database
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(cfg.max_conns.max(1));
    }

    let unavailable = |source: DbErr| StoreError::Unavailable {
        dsn: shown.clone(),
        source,
    };
    let conn = Database::connect(opts).await.map_err(unavailable)?;
    conn.ping().await.map_err(unavailable)?;
    debug!("Store ping succeeded");

    let repo = SeaOrmRegistrationsRepository::new(conn, cfg.collection_name.clone());
    repo.ensure_collection()
        .await
        .map_err(|source| StoreError::Collection {
            collection: cfg.collection_name.clone(),
            source,
        })?;

    info!("Registration store ready");
    Ok(repo)
}
