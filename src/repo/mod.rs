//! Tile repository: the cache façade.
//!
//! [`TileRepo`] is the synchronous, non-blocking entry point the renderer
//! calls once per tile per frame. A request resolves through the cache
//! tiers in order (resident texture, decoded pixels awaiting upload,
//! decode in flight, cached on disk, download in flight) and on a complete
//! miss arms the background download worker. The caller never waits: a tile
//! that is not ready yields `None` and the renderer substitutes a
//! placeholder until a later frame finds it resident.
//!
//! # Recency and eviction
//!
//! [`TileRepo::begin_frame`] advances the recency epoch of every table once
//! per rendered frame. Each `get_texture` touch re-stamps the entry as most
//! urgent, so the workers service the tiles the camera looked at most
//! recently, and eviction removes the resident texture that has gone
//! longest without a touch.

mod config;
mod decoder;
mod downloader;
mod path;
mod signal;

pub use config::RepoConfig;
pub use path::{parse_tile_filename, tile_filename, tile_path};

use crate::coord::TileKey;
use crate::decode::{ImageTileDecoder, PixelBuffer, TileDecoder};
use crate::fetch::{FetchError, HttpFetcher, TileFetcher};
use crate::source::TileSource;
use crate::table::TileTable;
use crate::texture::{TextureHandle, TextureUploader};
use signal::WakeSignal;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur constructing a [`TileRepo`].
///
/// Construction is the only fallible operation: once a repo exists, a tile
/// that cannot be acquired simply stays "not ready".
#[derive(Debug, Error)]
pub enum RepoError {
    /// Cache directory could not be created or scanned
    #[error("cache directory error: {0}")]
    CacheDir(#[from] std::io::Error),

    /// HTTP fetcher could not be constructed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Entry counts of the five tile tables, captured at one instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepoStats {
    /// Textures resident in GPU memory
    pub resident: usize,
    /// Decoded pixel buffers awaiting upload
    pub pending_decoded: usize,
    /// Tiles cached on disk
    pub on_disk: usize,
    /// Downloads in flight
    pub downloading: usize,
    /// Decodes in flight
    pub decoding: usize,
}

/// State shared between the façade and the worker threads.
pub(crate) struct RepoShared {
    pub(crate) source: Box<dyn TileSource>,
    pub(crate) fetcher: Box<dyn TileFetcher>,
    pub(crate) decoder: Box<dyn TileDecoder>,
    pub(crate) cache_dir: PathBuf,
    pub(crate) idle_poll_interval: Duration,
    pub(crate) failure_cooldown: Duration,
    pub(crate) shutdown: AtomicBool,
    pub(crate) download_wake: WakeSignal,
    pub(crate) decode_wake: WakeSignal,

    /// Textures resident on the GPU; only the façade touches this table.
    pub(crate) resident: TileTable<TextureHandle>,
    /// Decoded pixels awaiting upload; written by the decode worker.
    pub(crate) pending_decoded: TileTable<PixelBuffer>,
    /// Tiles present in the disk cache; written by both workers.
    pub(crate) on_disk: TileTable<()>,
    /// Downloads in flight; drained by the download worker.
    pub(crate) downloading: TileTable<()>,
    /// Decodes in flight; drained by the decode worker.
    pub(crate) decoding: TileTable<()>,
}

impl RepoShared {
    pub(crate) fn tile_path(&self, key: &TileKey) -> PathBuf {
        path::tile_path(
            &self.cache_dir,
            self.source.name(),
            self.source.file_extension(),
            key,
        )
    }
}

/// On-demand tile texture cache.
///
/// See the [module documentation](self) for the resolution order and
/// recency model.
pub struct TileRepo {
    shared: Arc<RepoShared>,
    uploader: Box<dyn TextureUploader>,
    max_resident_textures: usize,
    download_worker: Option<JoinHandle<()>>,
    decode_worker: Option<JoinHandle<()>>,
}

impl TileRepo {
    /// Create a repo with the default HTTP fetcher and image decoder.
    ///
    /// # Errors
    ///
    /// Fails if the cache directory cannot be created or scanned, or the
    /// HTTP client cannot be constructed. These are the only fatal
    /// conditions; everything later degrades to "tile not ready".
    pub fn new(
        source: impl TileSource + 'static,
        config: RepoConfig,
        uploader: impl TextureUploader + 'static,
    ) -> Result<Self, RepoError> {
        let fetcher = HttpFetcher::new()?;
        Self::with_parts(source, config, fetcher, ImageTileDecoder::new(), uploader)
    }

    /// Create a repo with explicit fetch and decode primitives.
    ///
    /// This is the full-injection constructor used by tests and by callers
    /// with custom transport needs.
    pub fn with_parts(
        source: impl TileSource + 'static,
        config: RepoConfig,
        fetcher: impl TileFetcher + 'static,
        decoder: impl TileDecoder + 'static,
        uploader: impl TextureUploader + 'static,
    ) -> Result<Self, RepoError> {
        fs::create_dir_all(&config.cache_dir)?;

        let shared = Arc::new(RepoShared {
            source: Box::new(source),
            fetcher: Box::new(fetcher),
            decoder: Box::new(decoder),
            cache_dir: config.cache_dir,
            idle_poll_interval: config.idle_poll_interval,
            failure_cooldown: config.failure_cooldown,
            shutdown: AtomicBool::new(false),
            download_wake: WakeSignal::new(),
            decode_wake: WakeSignal::new(),
            resident: TileTable::new(),
            pending_decoded: TileTable::new(),
            on_disk: TileTable::new(),
            downloading: TileTable::new(),
            decoding: TileTable::new(),
        });

        let found = scan_disk_tiles(&shared)?;
        info!(
            source = shared.source.name(),
            tiles = found,
            "seeded on-disk table from cache directory"
        );

        let download_worker = {
            let shared = shared.clone();
            thread::Builder::new()
                .name("tile-downloader".to_string())
                .spawn(move || downloader::run(shared))
                .expect("Failed to spawn download worker thread")
        };

        let decode_worker = {
            let shared = shared.clone();
            thread::Builder::new()
                .name("tile-decoder".to_string())
                .spawn(move || decoder::run(shared))
                .expect("Failed to spawn decode worker thread")
        };

        Ok(Self {
            shared,
            uploader: Box::new(uploader),
            max_resident_textures: config.max_resident_textures,
            download_worker: Some(download_worker),
            decode_worker: Some(decode_worker),
        })
    }

    /// Begin a new frame.
    ///
    /// Must be called once per rendered frame, before that frame's
    /// `get_texture` calls: it advances every table's recency epoch so this
    /// frame's touches outrank all earlier ones.
    pub fn begin_frame(&self) {
        self.shared.resident.begin_epoch();
        self.shared.pending_decoded.begin_epoch();
        self.shared.on_disk.begin_epoch();
        self.shared.downloading.begin_epoch();
        self.shared.decoding.begin_epoch();
    }

    /// Resolve a tile to its GPU texture, arming acquisition on a miss.
    ///
    /// Returns `None` while the tile is anywhere short of resident; the
    /// call never blocks on I/O or on worker completion. The only
    /// synchronous GPU work is uploading a buffer the decode worker already
    /// produced, which must happen here because this is the renderer's
    /// thread.
    pub fn get_texture(&self, key: TileKey) -> Option<TextureHandle> {
        // Tier 1: already resident. The lookup re-stamps the entry, which
        // is what protects it from eviction.
        if let Some(handle) = self.shared.resident.get(&key) {
            return Some(handle);
        }

        // Tier 2: decoded pixels are waiting. Upload now, then make room.
        if let Some(buffer) = self.shared.pending_decoded.remove(&key) {
            return self.upload_and_evict(key, buffer);
        }

        // Tier 3: decode already in flight, be patient.
        if self.shared.decoding.get(&key).is_some() {
            return None;
        }

        // Tier 4: on disk, ask the decode worker for it.
        if self.shared.on_disk.get(&key).is_some() {
            self.shared.decoding.put(key, ());
            self.shared.decode_wake.notify();
            return None;
        }

        // Tier 5: download already in flight.
        if self.shared.downloading.get(&key).is_some() {
            return None;
        }

        // Tier 6: never seen before, ask the download worker for it.
        self.shared.downloading.put(key, ());
        self.shared.download_wake.notify();
        None
    }

    /// Upload a decoded buffer and insert it as resident, evicting the
    /// least-urgent texture if the table is at capacity.
    fn upload_and_evict(&self, key: TileKey, buffer: PixelBuffer) -> Option<TextureHandle> {
        let Some(handle) = self.uploader.upload(&buffer) else {
            // The disk entry survives, so a later request re-decodes.
            warn!(tile = %key, "texture upload rejected, tile stays unavailable");
            return None;
        };
        drop(buffer);

        if self.shared.resident.len() >= self.max_resident_textures {
            if let Some(victim) = self.shared.resident.least_urgent() {
                if let Some(old) = self.shared.resident.remove(&victim) {
                    debug!(tile = %victim, "evicting least recently used texture");
                    self.uploader.delete(old);
                }
            }
        }

        self.shared.resident.put(key, handle);
        Some(handle)
    }

    /// Release all GPU memory held by the cache.
    ///
    /// Deletes every resident texture and drops every decoded buffer
    /// awaiting upload. The disk cache is untouched, so released tiles
    /// re-enter through the decode path. Intended for memory-pressure
    /// signals from the platform.
    pub fn free_memory(&self) {
        let resident = self.shared.resident.drain();
        let count = resident.len();
        for (_, handle) in resident {
            self.uploader.delete(handle);
        }
        self.shared.pending_decoded.clear();

        info!(textures = count, "released resident GPU textures");
    }

    /// Stop the workers and release GPU memory.
    ///
    /// In-flight downloads or decodes are allowed to finish; the workers
    /// observe the shutdown flag at the top of their loops. Called
    /// automatically on drop.
    pub fn close(&mut self) {
        if self.download_worker.is_none() && self.decode_worker.is_none() {
            return;
        }

        self.shared.shutdown.store(true, Ordering::Relaxed);
        self.shared.download_wake.notify();
        self.shared.decode_wake.notify();

        for worker in [self.download_worker.take(), self.decode_worker.take()]
            .into_iter()
            .flatten()
        {
            if let Err(e) = worker.join() {
                warn!("worker thread panicked: {:?}", e);
            }
        }

        self.free_memory();
    }

    /// Entry counts of all five tables.
    pub fn stats(&self) -> RepoStats {
        RepoStats {
            resident: self.shared.resident.len(),
            pending_decoded: self.shared.pending_decoded.len(),
            on_disk: self.shared.on_disk.len(),
            downloading: self.shared.downloading.len(),
            decoding: self.shared.decoding.len(),
        }
    }
}

impl Drop for TileRepo {
    fn drop(&mut self) {
        self.close();
    }
}

/// Seed the on-disk table from the cache directory contents.
///
/// Files of other sources and files that do not follow the naming scheme
/// are left alone.
fn scan_disk_tiles(shared: &RepoShared) -> Result<usize, std::io::Error> {
    let mut found = 0usize;

    for entry in fs::read_dir(&shared.cache_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        if let Some(key) = path::parse_tile_filename(
            shared.source.name(),
            shared.source.file_extension(),
            name,
        ) {
            shared.on_disk.put(key, ());
            found += 1;
        }
    }

    Ok(found)
}
