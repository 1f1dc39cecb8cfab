// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "RaceTime";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "racetime";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".racetime";

/// Plain-text body served at `GET /`
pub const ROOT_BANNER_TEXT: &str = "Race Timing System Backend Running";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "racetime.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "RACETIME_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "RACETIME_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "RACETIME_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "RACETIME_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5001;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "RACETIME_DATA_DIR";

// =============================================================================
// Authentication
// =============================================================================

/// Environment variable for the session signing secret
pub const ENV_SESSION_SECRET: &str = "RACETIME_SESSION_SECRET";

/// Cookie name for session token
pub const SESSION_COOKIE_NAME: &str = "racetime_session";

/// Default session TTL in days
pub const DEFAULT_SESSION_TTL_DAYS: u32 = 7;

/// Minimum accepted length of a configured signing secret (bytes)
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Minimum password length at registration
pub const MIN_PASSWORD_LEN: u64 = 8;

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "racetime.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for general API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Body limit for auth endpoints (64 KB)
pub const AUTH_BODY_LIMIT: usize = 64 * 1024;

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
