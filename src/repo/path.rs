//! Cache file naming.
//!
//! One file per tile lives directly under the cache directory, named
//! `{source}-{zoom}-{col}-{row}{extension}`. The encoding is reversible:
//! the startup disk scan parses filenames back into keys, which makes the
//! directory contents the ground truth for the on-disk table across
//! restarts.

use crate::coord::TileKey;
use std::path::{Path, PathBuf};

/// Filename for a tile of the given source.
///
/// # Example
///
/// ```
/// use tilevault::coord::TileKey;
/// use tilevault::repo::tile_filename;
///
/// let key = TileKey::new(15, 5279, 12754);
/// assert_eq!(
///     tile_filename("OpenStreetMap", ".png", &key),
///     "OpenStreetMap-15-5279-12754.png"
/// );
/// ```
pub fn tile_filename(source_name: &str, extension: &str, key: &TileKey) -> String {
    format!(
        "{}-{}-{}-{}{}",
        source_name, key.zoom, key.col, key.row, extension
    )
}

/// Full path of a tile's cache file.
pub fn tile_path(cache_dir: &Path, source_name: &str, extension: &str, key: &TileKey) -> PathBuf {
    cache_dir.join(tile_filename(source_name, extension, key))
}

/// Parse a cache filename back into a tile key.
///
/// Returns `None` for files that belong to a different source, carry a
/// different extension, or do not follow the naming scheme.
pub fn parse_tile_filename(source_name: &str, extension: &str, filename: &str) -> Option<TileKey> {
    let rest = filename
        .strip_prefix(source_name)?
        .strip_prefix('-')?
        .strip_suffix(extension)?;

    let mut parts = rest.split('-');
    let zoom = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    let row = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(TileKey::new(zoom, col, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_roundtrip() {
        let key = TileKey::new(15, 5279, 12754);
        let filename = tile_filename("Bing", ".png", &key);

        assert_eq!(parse_tile_filename("Bing", ".png", &filename), Some(key));
    }

    #[test]
    fn test_parse_rejects_other_sources() {
        let key = TileKey::new(10, 1, 2);
        let filename = tile_filename("OpenStreetMap", ".png", &key);

        assert_eq!(parse_tile_filename("Bing", ".png", &filename), None);
    }

    #[test]
    fn test_parse_rejects_other_extensions() {
        assert_eq!(
            parse_tile_filename("Bing", ".png", "Bing-10-1-2.jpg"),
            None
        );
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        assert_eq!(parse_tile_filename("Bing", ".png", "Bing-10-1.png"), None);
        assert_eq!(parse_tile_filename("Bing", ".png", "Bing-a-b-c.png"), None);
        assert_eq!(parse_tile_filename("Bing", ".png", "Bing-10-1-2-3.png"), None);
        assert_eq!(parse_tile_filename("Bing", ".png", "readme.txt"), None);
    }

    #[test]
    fn test_tile_path_is_flat_under_cache_dir() {
        let key = TileKey::new(3, 4, 5);
        let path = tile_path(Path::new("/cache"), "Bing", ".png", &key);

        assert_eq!(path, PathBuf::from("/cache/Bing-3-4-5.png"));
    }
}
