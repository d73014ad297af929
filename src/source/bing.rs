//! Bing Maps tile source

use super::TileSource;
use crate::coord::{tile_to_quadkey, TileKey};

/// Bing Maps road-layer tile source.
///
/// Bing addresses tiles by quadkey rather than z/x/y: one base-4 digit per
/// zoom level, derived from the interleaved column/row bits.
pub struct BingSource {
    base_url: String,
}

impl BingSource {
    /// Creates a source pointing at the public virtualearth tile servers.
    pub fn new() -> Self {
        Self {
            base_url: "https://ecn.t0.tiles.virtualearth.net/tiles/r{quadkey}.png?g=452&mkt=en-us"
                .to_string(),
        }
    }

    /// Creates a source with a custom base URL.
    ///
    /// The base URL should contain `{quadkey}` as a placeholder.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for BingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for BingSource {
    fn name(&self) -> &str {
        "Bing"
    }

    fn file_extension(&self) -> &str {
        ".png"
    }

    fn url_for(&self, key: &TileKey) -> String {
        self.base_url.replace("{quadkey}", &tile_to_quadkey(key))
    }
}
