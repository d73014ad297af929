//! Background download worker.
//!
//! Pulls the most urgent key from the in-flight-download table, fetches its
//! remote resource into a temporary file, and atomically promotes it into
//! the persistent cache. A failed fetch leaves the key queued so it is
//! retried after a fixed cooldown; one unreachable server must not turn the
//! loop into a busy spin.

use super::RepoShared;
use crate::coord::TileKey;
use crate::fetch::FetchError;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub(crate) fn run(shared: Arc<RepoShared>) {
    debug!("download worker started");

    while !shared.shutdown.load(Ordering::Relaxed) {
        let Some(key) = shared.downloading.most_urgent() else {
            shared.download_wake.wait_timeout(shared.idle_poll_interval);
            continue;
        };

        match download_tile(&shared, &key) {
            Ok(()) => {
                debug!(tile = %key, "tile promoted to disk cache");
            }
            Err(e) => {
                warn!(tile = %key, error = %e, "tile download failed, cooling down");
                // The key stays queued for retry; wait out the cooldown
                // (a wake-up can cut it short).
                shared.download_wake.wait_timeout(shared.failure_cooldown);
            }
        }
    }

    debug!("download worker stopped");
}

fn download_tile(shared: &RepoShared, key: &TileKey) -> Result<(), FetchError> {
    let url = shared.source.url_for(key);
    let dest = shared.tile_path(key);

    // Download into a sibling temp file and rename into place, so a reader
    // never observes a half-written tile.
    let temp = NamedTempFile::new_in(&shared.cache_dir)?;
    shared.fetcher.fetch(&url, temp.path())?;
    temp.persist(&dest).map_err(|e| FetchError::Io(e.error))?;

    shared.on_disk.put(*key, ());
    shared.downloading.remove(key);
    Ok(())
}
