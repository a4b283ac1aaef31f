//! DuckDB analytics service
//!
//! Provides the embedded analytics database for the server.
//! All schema definitions and migrations are managed here.

pub mod error;
pub mod filters;
mod migrations;
pub mod repositories;
mod repository_impl;
pub mod schema;

pub use error::DuckdbError;

use std::sync::Arc;
use std::time::Duration;

use duckdb::Connection;
use parking_lot::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::constants::{DUCKDB_CHECKPOINT_INTERVAL_SECS, DUCKDB_DB_FILENAME};
use crate::core::storage::{AppStorage, DataSubdir};

/// DuckDB analytics service
///
/// Handles database initialization and background tasks.
/// Uses a single shared connection protected by a mutex.
pub struct DuckdbService {
    conn: Mutex<Option<Connection>>,
    query_timeout: Duration,
}

impl Drop for DuckdbService {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.get_mut().take() {
            // Best-effort close - log but don't panic on error
            if let Err((_, e)) = conn.close() {
                tracing::warn!("DuckDB connection close failed during drop: {}", e);
            }
        }
    }
}

impl DuckdbService {
    /// Open (or create) the database file and apply pending migrations
    pub async fn init(storage: &AppStorage, query_timeout: Duration) -> Result<Self, DuckdbError> {
        let db_path = storage.subdir(DataSubdir::Duckdb).join(DUCKDB_DB_FILENAME);
        let log_path = db_path.clone();

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(
                "SET autoinstall_known_extensions = false;
                 SET autoload_known_extensions = false;
                 PRAGMA enable_checkpoint_on_shutdown;",
            )?;
            Ok::<_, duckdb::Error>(conn)
        })
        .await
        .map_err(|e| DuckdbError::Io(std::io::Error::other(e)))??;

        migrations::run_migrations(&conn)?;

        tracing::debug!(path = %log_path.display(), "DuckdbService initialized");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            query_timeout,
        })
    }

    /// In-memory database with the full schema (tests only)
    #[cfg(test)]
    pub fn open_in_memory(query_timeout: Duration) -> Result<Self, DuckdbError> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            query_timeout,
        })
    }

    /// Get exclusive access to the connection.
    ///
    /// # Panics
    /// Panics if the connection has been closed via `close()`.
    pub fn conn(&self) -> parking_lot::MappedMutexGuard<'_, Connection> {
        MutexGuard::map(self.conn.lock(), |opt| {
            opt.as_mut()
                .expect("DuckDB connection already closed - do not call conn() after close()")
        })
    }

    /// Check if the connection is still open (test utility only)
    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Run a blocking DuckDB query with the configured timeout
    ///
    /// A timed-out query keeps running on the blocking pool until DuckDB
    /// returns; only the caller stops waiting.
    pub async fn run_query<T, F>(&self, f: F) -> Result<T, DuckdbError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let timeout_secs = self.query_timeout.as_secs();
        tokio::time::timeout(self.query_timeout, tokio::task::spawn_blocking(f))
            .await
            .map_err(|_| {
                tracing::warn!("DuckDB query timed out after {}s", timeout_secs);
                DuckdbError::Timeout { timeout_secs }
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "DuckDB query task failed");
                DuckdbError::Io(std::io::Error::other(format!(
                    "Query execution failed: {}",
                    e
                )))
            })
    }

    /// Run a checkpoint to flush WAL to the main database file.
    ///
    /// Returns `Ok(())` if the connection is already closed (no-op).
    pub async fn checkpoint(self: &Arc<Self>) -> Result<(), DuckdbError> {
        let db = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let conn_guard = db.conn.lock();
            if let Some(ref conn) = *conn_guard {
                conn.execute("CHECKPOINT", [])?;
                tracing::debug!("DuckDB checkpoint completed");
            }
            Ok(())
        })
        .await
        .map_err(|e| DuckdbError::Io(std::io::Error::other(e)))?
    }

    /// Check that the connection is open and answers a trivial query
    pub async fn ping(self: &Arc<Self>) -> Result<(), DuckdbError> {
        let db = Arc::clone(self);
        self.run_query(move || {
            let conn_guard = db.conn.lock();
            let conn = conn_guard
                .as_ref()
                .ok_or_else(|| DuckdbError::Io(std::io::Error::other("connection closed")))?;
            conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))?;
            Ok::<_, DuckdbError>(())
        })
        .await?
    }

    /// Close the DuckDB connection gracefully with explicit error handling
    pub async fn close(self: Arc<Self>) -> Result<(), DuckdbError> {
        tokio::task::spawn_blocking(move || {
            let mut conn_guard = self.conn.lock();
            if let Some(conn) = conn_guard.take() {
                // Best-effort checkpoint before close - log but don't fail on error
                if let Err(e) = conn.execute("CHECKPOINT", []) {
                    tracing::warn!("CHECKPOINT failed during close: {}", e);
                }
                conn.close().map_err(|(_, e)| DuckdbError::Database(e))?;
                tracing::debug!("DuckDB connection closed");
            }
            Ok(())
        })
        .await
        .map_err(|e| DuckdbError::Io(std::io::Error::other(e)))?
    }

    pub fn start_checkpoint_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let db = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(DUCKDB_CHECKPOINT_INTERVAL_SECS));
            // First tick completes immediately; nothing to flush yet
            interval.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::debug!("DuckDB checkpoint task shutting down");
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        if let Err(e) = db.checkpoint().await {
                            tracing::warn!("DuckDB checkpoint failed: {}", e);
                        }
                    }
                }
            }
        })
    }
}

/// Execute a function within a transaction, automatically rolling back on error.
pub(crate) fn in_transaction<F, T>(conn: &Connection, f: F) -> Result<T, DuckdbError>
where
    F: FnOnce(&Connection) -> Result<T, DuckdbError>,
{
    conn.execute_batch("BEGIN TRANSACTION")?;
    match f(conn) {
        Ok(val) => {
            conn.execute_batch("COMMIT")?;
            Ok(val)
        }
        Err(e) => {
            // Best-effort rollback - log but return original error
            if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                tracing::warn!("ROLLBACK failed after transaction error: {}", rollback_err);
            }
            Err(e)
        }
    }
}
