//! Configuration types for update-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the orchestration core
///
/// Every field has a serde default, so a partially specified document (or
/// `Config::default()`) works out of the box.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory under which each task creates its exclusive working directory
    /// (default: "./download-cache")
    #[serde(default = "default_cache_dir")]
    pub download_cache_dir: PathBuf,

    /// Automatic retry attempt limit passed to the engine per request (default: 3)
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Buffer size of the broadcast event channels (default: 256)
    ///
    /// A subscriber that falls behind by more than this many events receives
    /// a lagged error from the channel instead of the missed events.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_cache_dir: default_cache_dir(),
            retry_max_attempts: default_retry_max_attempts(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./download-cache")
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_event_buffer() -> usize {
    256
}
