//! Background decode worker.
//!
//! Pulls the most urgent key from the in-flight-decode table, decodes its
//! cached file, and promotes the pixels to the pending-decoded table for
//! the renderer thread to upload. A file that fails to decode is presumed
//! corrupt: its on-disk entry is dropped so the next request re-downloads
//! it. The key always leaves the in-flight table, success or not, so it
//! becomes eligible for a fresh request.

use super::RepoShared;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) fn run(shared: Arc<RepoShared>) {
    debug!("decode worker started");

    while !shared.shutdown.load(Ordering::Relaxed) {
        let Some(key) = shared.decoding.most_urgent() else {
            shared.decode_wake.wait_timeout(shared.idle_poll_interval);
            continue;
        };

        let path = shared.tile_path(&key);
        match shared.decoder.decode(&path, shared.source.flip_vertical()) {
            Ok(buffer) => {
                debug!(
                    tile = %key,
                    format = %buffer.format,
                    bytes = buffer.size_bytes(),
                    "tile decoded"
                );
                shared.pending_decoded.put(key, buffer);
            }
            Err(e) => {
                warn!(tile = %key, error = %e, "tile decode failed, invalidating disk entry");
                shared.on_disk.remove(&key);
            }
        }

        shared.decoding.remove(&key);
    }

    debug!("decode worker stopped");
}
