//! tilevault - On-demand tile texture cache for map and globe renderers
//!
//! Given a (zoom, column, row) tile key, the cache returns a ready-to-use
//! GPU texture handle if one is resident, and otherwise arms an
//! asynchronous acquisition pipeline (network download, disk cache, image
//! decode, GPU upload) without ever blocking the caller.
//!
//! # High-Level API
//!
//! The [`repo`] module provides the façade the renderer talks to:
//!
//! ```ignore
//! use tilevault::repo::{RepoConfig, TileRepo};
//! use tilevault::source::OpenStreetMapSource;
//!
//! let repo = TileRepo::new(OpenStreetMapSource::new(), RepoConfig::default(), gl_uploader)?;
//!
//! // Once per rendered frame:
//! repo.begin_frame();
//! for key in visible_tiles {
//!     match repo.get_texture(key) {
//!         Some(handle) => draw_tile(key, handle),
//!         None => draw_placeholder(key), // acquisition runs in the background
//!     }
//! }
//! ```

pub mod coord;
pub mod decode;
pub mod fetch;
pub mod logging;
pub mod repo;
pub mod source;
pub mod table;
pub mod texture;

/// Version of the tilevault library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_coord_module_exists() {
        // Verify coord module is accessible
        let result = coord::to_tile_key(40.7128, -74.0060, 16);
        assert!(result.is_ok());
    }
}
