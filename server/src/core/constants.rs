// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Blogscope";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "blogscope";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".blogscope";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "blogscope.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "BLOGSCOPE_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "BLOGSCOPE_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "BLOGSCOPE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "BLOGSCOPE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "BLOGSCOPE_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Maximum request body size (the API is read-only)
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "BLOGSCOPE_DATA_DIR";

// =============================================================================
// DuckDB Database
// =============================================================================

/// DuckDB database filename
pub const DUCKDB_DB_FILENAME: &str = "blogscope.db";

/// DuckDB checkpoint interval in seconds
pub const DUCKDB_CHECKPOINT_INTERVAL_SECS: u64 = 300;

/// Environment variable for query timeout
pub const ENV_QUERY_TIMEOUT_SECS: &str = "BLOGSCOPE_QUERY_TIMEOUT_SECS";

/// Default DuckDB query timeout in seconds
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Reporting
// =============================================================================

/// Number of rows returned by the top-N report
pub const REPORT_TOP_LIMIT: usize = 10;

/// Maximum number of time buckets in a performance report
pub const MAX_PERFORMANCE_BUCKETS: usize = 1000;

// =============================================================================
// Seeding
// =============================================================================

pub const DEFAULT_SEED_COUNTRIES: usize = 10;
pub const DEFAULT_SEED_USERS: usize = 50;
pub const DEFAULT_SEED_BLOGS: usize = 200;
pub const DEFAULT_SEED_VIEWS: usize = 1000;

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Cache
// =============================================================================

/// Environment variable to enable/disable the report cache
pub const ENV_CACHE_ENABLED: &str = "BLOGSCOPE_CACHE_ENABLED";

/// Environment variable for max cache entries
pub const ENV_CACHE_MAX_ENTRIES: &str = "BLOGSCOPE_CACHE_MAX_ENTRIES";

/// Default max cache entries
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;

/// Cache key version prefix (bump to invalidate all keys)
pub const CACHE_KEY_VERSION: &str = "v1";

/// TTL for cached report responses (seconds)
pub const CACHE_TTL_REPORT: u64 = 900;

/// Windows ending closer to now than this are never cached (seconds)
pub const CACHE_MIN_WINDOW_AGE_SECS: i64 = 300;
