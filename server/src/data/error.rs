//! Error type for the data layer
//!
//! Wraps store errors while preserving which backend produced them, so the
//! API layer can log the source and map every store failure to a 500.

use thiserror::Error;

use crate::data::duckdb::DuckdbError;

/// Error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// DuckDB database error (analytics backend)
    #[error("DuckDB error: {0}")]
    Duckdb(#[from] duckdb::Error),

    /// Migration failed
    #[error("Migration {version} ({name}) failed on {backend}: {error}")]
    MigrationFailed {
        backend: &'static str,
        version: i32,
        name: String,
        error: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Query timeout
    #[error("Query timeout after {timeout_secs}s on {backend}")]
    Timeout {
        backend: &'static str,
        timeout_secs: u64,
    },

    /// Request cannot be answered with the stored data (e.g. too many buckets)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl DataError {
    /// Create a timeout error
    pub fn timeout(backend: &'static str, timeout_secs: u64) -> Self {
        Self::Timeout {
            backend,
            timeout_secs,
        }
    }

    /// Check if this error is transient (retrying later may succeed)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Duckdb(_) => "duckdb",
            Self::MigrationFailed { backend, .. } => backend,
            Self::Timeout { backend, .. } => backend,
            Self::Io(_) | Self::InvalidQuery(_) => "unknown",
        }
    }
}

impl From<DuckdbError> for DataError {
    fn from(e: DuckdbError) -> Self {
        match e {
            DuckdbError::Database(e) => Self::Duckdb(e),
            DuckdbError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                backend: "duckdb",
                version,
                name,
                error,
            },
            DuckdbError::Io(e) => Self::Io(e),
            DuckdbError::Timeout { timeout_secs } => Self::Timeout {
                backend: "duckdb",
                timeout_secs,
            },
            DuckdbError::InvalidQuery(msg) => Self::InvalidQuery(msg),
        }
    }
}
