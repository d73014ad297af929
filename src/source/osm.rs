//! OpenStreetMap tile source

use super::TileSource;
use crate::coord::TileKey;

/// OpenStreetMap standard-layer tile source.
///
/// Uses the z/x/y path addressing scheme common to slippy-map servers.
pub struct OpenStreetMapSource {
    base_url: String,
}

impl OpenStreetMapSource {
    /// Creates a source pointing at the public OpenStreetMap tile server.
    pub fn new() -> Self {
        Self {
            base_url: "https://tile.openstreetmap.org".to_string(),
        }
    }

    /// Creates a source with a custom base URL.
    ///
    /// Useful for testing or for mirrors that share the z/x/y scheme.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for OpenStreetMapSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for OpenStreetMapSource {
    fn name(&self) -> &str {
        "OpenStreetMap"
    }

    fn file_extension(&self) -> &str {
        ".png"
    }

    fn url_for(&self, key: &TileKey) -> String {
        format!(
            "{}/{}/{}/{}.png",
            self.base_url, key.zoom, key.col, key.row
        )
    }
}
