// TeleSift - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "TeleSift";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "TeleSift";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Header grammar
// =============================================================================

/// Names of the four header columns that prefix every row, in order.
pub const HEADER_COLUMNS: [&str; 4] = ["datetime", "code", "thread_id", "level"];

/// Full-width comma emitted by some controllers in place of ASCII ','.
pub const FULLWIDTH_COMMA: char = '\u{FF0C}';

// =============================================================================
// Log source limits
// =============================================================================

/// Default address of the controller PC serving the telemetry dump.
pub const DEFAULT_SOURCE_ADDRESS: &str = "192.168.0.50:6000";

/// Chunk size for socket reads.
pub const SOURCE_READ_CHUNK_SIZE: usize = 4 * 1024; // 4 KiB

/// Default TCP connect timeout (ms).
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Default per-read socket timeout (ms). A stalled peer fails the transfer.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 60_000;

/// Minimum user-configurable timeout (ms).
pub const MIN_TIMEOUT_MS: u64 = 100;

/// Maximum user-configurable timeout (ms).
pub const MAX_TIMEOUT_MS: u64 = 600_000; // 10 min

/// Default upper bound on a single transfer. Exceeding it fails the transfer.
pub const DEFAULT_MAX_TRANSFER_BYTES: usize = 256 * 1024 * 1024; // 256 MiB

/// Hard upper bound on the configurable transfer size.
pub const ABSOLUTE_MAX_TRANSFER_BYTES: usize = 2 * 1024 * 1024 * 1024 - 1; // < 2 GiB

/// File size above which a captured dump is memory-mapped instead of read.
pub const LARGE_FILE_THRESHOLD: u64 = 64 * 1024 * 1024; // 64 MiB

// =============================================================================
// Decoding
// =============================================================================

/// Primary legacy code page of the controller dumps (CP949).
pub const DEFAULT_PRIMARY_ENCODING: &str = "windows-949";

/// Secondary code page tried when the primary rejects the bytes.
pub const DEFAULT_FALLBACK_ENCODING: &str = "euc-kr";

// =============================================================================
// Descriptor limits
// =============================================================================

/// Maximum number of subsystem descriptors (built-in + user).
pub const MAX_DESCRIPTORS: usize = 64;

/// Maximum size of a descriptor TOML file in bytes.
pub const MAX_DESCRIPTOR_FILE_SIZE: u64 = 64 * 1024; // 64 KB

/// Maximum number of columns a single table may declare.
pub const MAX_TABLE_COLUMNS: usize = 1_024;

/// Placeholder substituted with the channel number in column templates.
pub const TEMPLATE_CHANNEL_PLACEHOLDER: &str = "{n}";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a raw line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// User descriptor subdirectory name.
pub const DESCRIPTORS_DIR_NAME: &str = "subsystems";

/// Default output directory for sink files, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "telesift-out";
