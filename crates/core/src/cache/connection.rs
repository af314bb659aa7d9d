//! Database connection management.
//!
//! Opens the SQLite file, applies the WAL pragmas and brings the
//! `kv_entries` schema up to date. The schema version lives in SQLite's
//! `user_version` header field rather than a bookkeeping table.

use crate::Error;
use std::path::Path;
use tokio_rusqlite::{Connection, rusqlite};

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

const SCHEMA: &str = include_str!("../../schema/kv_entries.sql");

/// Version written to `user_version` once the schema is applied.
pub const SCHEMA_VERSION: i64 = 1;

/// Cache database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Cloning shares the same connection.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas and the schema.
    /// Fails on a file written by a newer schema version.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database.
    ///
    /// Used by tests, and as the fallback when the configured file can't be opened.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| -> Result<(), Error> {
            conn.execute_batch(PRAGMAS)?;
            apply_schema(conn)
        })
        .await
        .map_err(Error::from)?;

        Ok(Self { conn })
    }
}

/// Create `kv_entries` on a fresh file and stamp the version, in one transaction.
fn apply_schema(conn: &mut rusqlite::Connection) -> Result<(), Error> {
    let found: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if found > SCHEMA_VERSION {
        return Err(Error::UnsupportedSchema(format!(
            "database is at version {found}, this build supports up to {SCHEMA_VERSION}"
        )));
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    tracing::debug!(from = found, to = SCHEMA_VERSION, "applying cache schema");
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}
