//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile keys used by slippy-map imagery servers, plus the
//! quadkey encoding used by Bing-style servers.

mod types;

pub use types::{CoordError, TileKey, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};

use std::f64::consts::PI;

/// Converts geographic coordinates to a tile key.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 19)
///
/// # Returns
///
/// A `Result` containing the tile key or an error if inputs are invalid.
#[inline]
pub fn to_tile_key(lat: f64, lon: f64, zoom: u8) -> Result<TileKey, CoordError> {
    // Validate inputs
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    // Number of tiles along one axis at this zoom level
    let n = 2.0_f64.powi(zoom as i32);

    // Longitude maps linearly to the column
    let col = ((lon + 180.0) / 360.0 * n) as u32;

    // Latitude maps to the row through the Web Mercator projection
    let lat_rad = lat * PI / 180.0;
    let row = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32;

    Ok(TileKey { zoom, col, row })
}

/// Converts a tile key back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner. The grid
/// position does not need to name an existing tile, so corner derivation can
/// evaluate the transform at `col + 1` / `row + 1`.
#[inline]
pub fn tile_to_lat_lon(zoom: u8, col: u32, row: u32) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);

    let lon = col as f64 / n * 360.0 - 180.0;

    let y = row as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

/// Returns the four corner coordinates of a tile as (lat, lon) pairs.
///
/// Order is southeast, southwest, northeast, northwest, matching the
/// traversal the renderer uses to build the tile's quad.
pub fn tile_corners(key: &TileKey) -> [(f64, f64); 4] {
    [
        tile_to_lat_lon(key.zoom, key.col + 1, key.row + 1),
        tile_to_lat_lon(key.zoom, key.col, key.row + 1),
        tile_to_lat_lon(key.zoom, key.col + 1, key.row),
        tile_to_lat_lon(key.zoom, key.col, key.row),
    ]
}

/// Converts a tile key to a Bing Maps quadkey.
///
/// One base-4 digit per zoom level, most significant first: at each level the
/// column bit contributes 1 and the row bit contributes 2.
pub fn tile_to_quadkey(key: &TileKey) -> String {
    let mut quadkey = String::with_capacity(key.zoom as usize);

    for i in (1..=key.zoom).rev() {
        let mask = 1u32 << (i - 1);
        let mut digit = 0u8;
        if key.col & mask != 0 {
            digit += 1;
        }
        if key.row & mask != 0 {
            digit += 2;
        }
        quadkey.push((b'0' + digit) as char);
    }

    quadkey
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let result = to_tile_key(40.7128, -74.0060, 16);
        assert!(result.is_ok(), "Valid coordinates should not error");

        let key = result.unwrap();
        assert_eq!(key.col, 19295);
        assert_eq!(key.row, 24640);
        assert_eq!(key.zoom, 16);
    }

    #[test]
    fn test_invalid_latitude() {
        let result = to_tile_key(90.0, 0.0, 10);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), CoordError::InvalidLatitude(_)));
    }

    #[test]
    fn test_invalid_zoom() {
        let result = to_tile_key(0.0, 0.0, MAX_ZOOM + 1);
        assert!(matches!(result.unwrap_err(), CoordError::InvalidZoom(_)));
    }

    #[test]
    fn test_tile_to_lat_lon_northwest_corner() {
        let (lat, lon) = tile_to_lat_lon(16, 19295, 24640);

        // Should be close to NYC but not exact (northwest corner of tile)
        assert!(
            (lat - 40.713).abs() < 0.01,
            "Latitude should be close to 40.713"
        );
        assert!(
            (lon - (-74.007)).abs() < 0.01,
            "Longitude should be close to -74.007"
        );
    }

    #[test]
    fn test_roundtrip_conversion() {
        let original_lat = 40.7128;
        let original_lon = -74.0060;
        let zoom = 16;

        let key = to_tile_key(original_lat, original_lon, zoom).unwrap();
        let (converted_lat, converted_lon) = tile_to_lat_lon(key.zoom, key.col, key.row);

        // At zoom 16 each tile is ~1.2km, so the corner is within a small tolerance
        assert!(
            (converted_lat - original_lat).abs() < 0.01,
            "Latitude should roundtrip within 0.01 degrees"
        );
        assert!(
            (converted_lon - original_lon).abs() < 0.01,
            "Longitude should roundtrip within 0.01 degrees"
        );
    }

    #[test]
    fn test_corners_ordering() {
        let key = TileKey::new(10, 512, 512);
        let [se, sw, ne, nw] = tile_corners(&key);

        // South corners are below north corners
        assert!(se.0 < ne.0);
        assert!(sw.0 < nw.0);
        // East corners are to the right of west corners
        assert!(se.1 > sw.1);
        assert!(ne.1 > nw.1);
        // Northwest corner equals the tile's own grid point
        assert_eq!(nw, tile_to_lat_lon(10, 512, 512));
    }

    #[test]
    fn test_quadkey_known_values() {
        // Worked example from the Bing tile system documentation:
        // tile (3, 5) at zoom 3 has quadkey "213"
        let key = TileKey::new(3, 3, 5);
        assert_eq!(tile_to_quadkey(&key), "213");
    }

    #[test]
    fn test_quadkey_length_matches_zoom() {
        for zoom in [1u8, 5, 10, 19] {
            let key = TileKey::new(zoom, 0, 0);
            assert_eq!(tile_to_quadkey(&key).len(), zoom as usize);
        }
    }

    #[test]
    fn test_quadkey_zoom_zero_is_empty() {
        let key = TileKey::new(0, 0, 0);
        assert_eq!(tile_to_quadkey(&key), "");
    }

    #[test]
    fn test_quadkey_origin_is_all_zeros() {
        let key = TileKey::new(4, 0, 0);
        assert_eq!(tile_to_quadkey(&key), "0000");
    }
}
