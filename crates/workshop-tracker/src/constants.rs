//! Centralized constants for the workshop tracker
//!
//! Deployment-specific settings are loaded from config.toml and the environment.

// =============================================================================
// Grouping Labels
// =============================================================================

/// Label for expenses without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Label for rows whose grouping key is blank or unparseable
pub const UNKNOWN: &str = "Unknown";

/// Payer name used for every income record in the contributor ledger
pub const COMPANY_REVENUE: &str = "Company Revenue";

// =============================================================================
// Presentation
// =============================================================================

/// Chart palette, assigned by position and wrapped when exhausted
pub const PALETTE: [&str; 8] = [
    "#4F46E5", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4", "#EC4899", "#84CC16",
];

/// Entries shown in headline cards
pub const HEADLINE_TOP_N: usize = 3;

/// Entries shown in mini charts
pub const MINI_CHART_TOP_N: usize = 4;

/// Entries shown in the workshop popularity chart
pub const POPULARITY_TOP_N: usize = 6;

/// Fixed date format for exports (en-US)
pub const EXPORT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Fixed timestamp format for export metadata (en-US, UTC)
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p UTC";

// =============================================================================
// Storage
// =============================================================================

/// Default store database path
pub const DEFAULT_STORE_PATH: &str = "./data/workshop.sqlite";

/// Timestamp format used for TEXT columns
pub const STORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQLite busy timeout (ms)
pub const STORE_BUSY_TIMEOUT_MS: u64 = 5000;

// =============================================================================
// Server & Functions
// =============================================================================

/// Default bind address for `serve`
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Default frontend origin used for CORS and email links
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Header carrying the caller's profile id for scoped endpoints
pub const USER_ID_HEADER: &str = "x-user-id";

/// Email trigger function path (appended to the functions base URL)
pub const SEND_EMAIL_PATH: &str = "/send-email";

/// Default timeout for the email trigger (seconds)
pub const DEFAULT_FUNCTIONS_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length accepted before calling the auth service
pub const MIN_PASSWORD_LENGTH: usize = 8;
