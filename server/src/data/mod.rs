//! Data storage layer
//!
//! - `duckdb` - Embedded analytics database, filter compiler and report queries
//! - `cache` - In-memory report response cache
//! - `types` - Report parameters, rows and dimension enums
//! - `traits` - Repository trait the API layer depends on
//! - `error` - Error type for the data layer

pub mod cache;
pub mod duckdb;
pub mod error;
pub mod traits;
pub mod types;

pub use duckdb::DuckdbService;
pub use error::DataError;
pub use traits::AnalyticsRepository;

// Re-export filters for API usage (predicate parsing and compilation)
pub use duckdb::filters;
