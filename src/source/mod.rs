//! Tile source abstraction.
//!
//! A [`TileSource`] describes one remote imagery server: its name (which
//! namespaces the disk cache), the file extension its tiles carry, whether
//! decoded images need a vertical flip, and the URL addressing scheme.
//! Sources are immutable for the lifetime of a cache session.

mod bing;
mod osm;

pub use bing::BingSource;
pub use osm::OpenStreetMapSource;

use crate::coord::TileKey;

/// Trait for remote tile imagery sources.
///
/// Implementations must be thread-safe (`Send + Sync`): the download worker
/// resolves URLs on a background thread while the renderer thread names
/// cache files after the source.
pub trait TileSource: Send + Sync {
    /// The source's name, used to namespace cached files on disk.
    ///
    /// Must be stable across sessions; changing it orphans the disk cache.
    fn name(&self) -> &str;

    /// File extension of this source's tiles, with the leading dot
    /// (e.g. ".png").
    fn file_extension(&self) -> &str;

    /// Whether decoded images must be flipped vertically before upload.
    ///
    /// Some servers deliver tiles with an inverted row order.
    fn flip_vertical(&self) -> bool {
        false
    }

    /// The download URL for a tile.
    ///
    /// Pure: the same key always yields the same URL.
    fn url_for(&self, key: &TileKey) -> String;
}
