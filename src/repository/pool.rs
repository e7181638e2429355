//! Connection sources for the record store.
//!
//! SQLite opens a fresh connection per operation; PostgreSQL draws from a
//! deadpool-managed pool. The URL decides which one is used.

use std::path::{Path, PathBuf};

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};

#[cfg(feature = "postgres")]
use diesel_async::pooled_connection::deadpool::Pool as DeadPool;
#[cfg(feature = "postgres")]
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
#[cfg(feature = "postgres")]
use diesel_async::AsyncPgConnection;

use super::util::{is_postgres_url, to_diesel_error};

pub type DieselError = diesel::result::Error;

pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

#[cfg(feature = "postgres")]
pub type PgConn = deadpool::managed::Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Milliseconds a SQLite writer waits on a locked database.
const SQLITE_BUSY_TIMEOUT_MS: u32 = 5_000;

#[cfg(feature = "postgres")]
const PG_MAX_CONNECTIONS: usize = 10;

/// A SQLite database file.
#[derive(Debug, Clone)]
pub struct SqlitePool {
    path: PathBuf,
}

impl SqlitePool {
    /// Accepts a bare path or a `sqlite:` URL.
    pub fn new(database_url: &str) -> Self {
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection with the busy timeout applied.
    pub async fn get(&self) -> Result<SqliteConn, DieselError> {
        let url = self.path.to_string_lossy();
        let mut conn = SqliteConn::establish(&url).await.map_err(to_diesel_error)?;
        conn.batch_execute(&format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS};"))
            .await?;
        Ok(conn)
    }
}

#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct PgPool {
    pool: DeadPool<AsyncPgConnection>,
}

#[cfg(feature = "postgres")]
impl PgPool {
    pub fn new(database_url: &str) -> Result<Self, DieselError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = DeadPool::builder(manager)
            .max_size(PG_MAX_CONNECTIONS)
            .build()
            .map_err(to_diesel_error)?;
        Ok(Self { pool })
    }

    pub async fn get(&self) -> Result<PgConn, DieselError> {
        self.pool.get().await.map_err(to_diesel_error)
    }
}

/// The record store's connection source.
#[derive(Clone)]
pub enum DbPool {
    Sqlite(SqlitePool),
    #[cfg(feature = "postgres")]
    Postgres(PgPool),
}

impl DbPool {
    /// `postgres://` and `postgresql://` URLs need the `postgres` feature;
    /// anything else is a SQLite path.
    pub fn from_url(url: &str) -> Result<Self, DieselError> {
        if !is_postgres_url(url) {
            return Ok(DbPool::Sqlite(SqlitePool::new(url)));
        }

        #[cfg(feature = "postgres")]
        {
            PgPool::new(url).map(DbPool::Postgres)
        }
        #[cfg(not(feature = "postgres"))]
        {
            Err(DieselError::QueryBuilderError(
                "PostgreSQL support not compiled. Use --features postgres".into(),
            ))
        }
    }

    pub fn sqlite_from_path(path: &Path) -> Self {
        DbPool::Sqlite(SqlitePool { path: path.into() })
    }

    /// Short backend name for status output.
    pub fn backend_name(&self) -> &'static str {
        match self {
            DbPool::Sqlite(_) => "sqlite",
            #[cfg(feature = "postgres")]
            DbPool::Postgres(_) => "postgres",
        }
    }
}

/// Run `$body` with `$conn` bound to a connection from either backend.
///
/// ```ignore
/// with_conn!(self.pool, conn => {
///     file_analysis_records::table.load::<AnalysisRow>(&mut conn).await
/// })
/// ```
#[macro_export]
macro_rules! with_conn {
    ($pool:expr, $conn:ident => $body:expr) => {
        $crate::with_conn_split!($pool, sqlite: $conn => $body, postgres: $conn => $body)
    };
}

/// Like [`with_conn!`], with a separate body per backend for dialect SQL.
#[macro_export]
macro_rules! with_conn_split {
    ($pool:expr, sqlite: $sqlite_conn:ident => $sqlite_body:expr, postgres: $pg_conn:ident => $pg_body:expr) => {{
        match &$pool {
            $crate::repository::pool::DbPool::Sqlite(pool) => {
                let mut $sqlite_conn = pool.get().await?;
                $sqlite_body
            }
            #[cfg(feature = "postgres")]
            $crate::repository::pool::DbPool::Postgres(pool) => {
                let mut $pg_conn = pool.get().await?;
                $pg_body
            }
        }
    }};
}
