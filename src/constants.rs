/// Site domains for each run mode
pub const DEV_DOMAIN: &str = "http://localhost:8000";
pub const PROD_DOMAIN: &str = "https://www.trackawesomelist.com";

/// Directory of rendered markdown inside a dist repository
pub const CONTENT_DIR: &str = "content";
pub const INDEX_MARKDOWN_PATH: &str = "README.md";

pub const DEFAULT_CATEGORY: &str = "Miscellaneous";
pub const DEFAULT_FILE_TYPE: &str = "list";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_BADGE_ENDPOINT: &str = "https://img.shields.io/github/stars";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 1000;
pub const DEFAULT_FILE_MIN_UPDATED_HOURS: u64 = 12;

const DAY_SECS: u64 = 24 * 60 * 60;
/// Cache TTL in production
pub const PROD_CACHE_TTL_SECS: u64 = 3 * DAY_SECS;
/// Cache TTL while developing locally
pub const DEV_CACHE_TTL_SECS: u64 = 30 * DAY_SECS;

/// Markup that closes a shields.io badge, right after the count text
pub const BADGE_SUFFIX: &str = "</text></a></g></svg>";
