//! Tile repository configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`TileRepo`](crate::repo::TileRepo).
#[derive(Debug, Clone)]
pub struct RepoConfig {
    /// Directory holding the persistent tile cache
    pub cache_dir: PathBuf,
    /// Maximum number of textures kept resident on the GPU (default: 150)
    pub max_resident_textures: usize,
    /// How long an idle worker sleeps before re-polling its queue
    /// (default: 5 s)
    pub idle_poll_interval: Duration,
    /// How long the download worker backs off after a failed fetch
    /// (default: 5 s)
    pub failure_cooldown: Duration,
}

impl Default for RepoConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tilevault");

        Self {
            cache_dir,
            max_resident_textures: 150,
            idle_poll_interval: Duration::from_secs(5),
            failure_cooldown: Duration::from_secs(5),
        }
    }
}

impl RepoConfig {
    /// Create a configuration with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the resident texture capacity.
    pub fn with_max_resident_textures(mut self, max: usize) -> Self {
        self.max_resident_textures = max;
        self
    }

    /// Set the idle poll interval for the worker loops.
    pub fn with_idle_poll_interval(mut self, interval: Duration) -> Self {
        self.idle_poll_interval = interval;
        self
    }

    /// Set the cooldown after a failed download.
    pub fn with_failure_cooldown(mut self, cooldown: Duration) -> Self {
        self.failure_cooldown = cooldown;
        self
    }
}
