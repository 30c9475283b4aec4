pub mod app;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod error;
pub mod fetch;
pub mod format;
pub mod infra;
pub mod items;
pub mod limiter;
pub mod logging;
pub mod metrics;
pub mod paths;

pub use cache::CacheStore;
pub use calendar::{DayInfo, DayNumber, WeekNumber, WeekOfYear};
pub use config::{Config, RunMode};
pub use error::{Result, TrackerError};
pub use fetch::{FetchOptions, Fetcher};
pub use limiter::run_limited;
