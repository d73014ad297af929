//! Tile image decode primitive.
//!
//! Decodes a cached tile file into a CPU-side pixel buffer ready for GPU
//! upload. The pixel format is chosen from the source image's properties:
//! images with an alpha channel keep full 32-bit color, opaque images are
//! repacked to 16-bit RGB565 to halve upload size, and grayscale mask
//! images become 8-bit alpha-only.

use image::{DynamicImage, RgbaImage};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::trace;

/// Pixel layout of a decoded tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8 bits per channel RGBA (4 bytes per pixel)
    Rgba8888,
    /// 5/6/5-bit RGB packed into a little-endian u16 (2 bytes per pixel)
    Rgb565,
    /// 8-bit alpha-only mask (1 byte per pixel)
    A8,
}

impl PixelFormat {
    /// Bytes occupied by one pixel in this format.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8888 => 4,
            PixelFormat::Rgb565 => 2,
            PixelFormat::A8 => 1,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Rgba8888 => write!(f, "RGBA8888"),
            PixelFormat::Rgb565 => write!(f, "RGB565"),
            PixelFormat::A8 => write!(f, "A8"),
        }
    }
}

/// A decoded tile image held in CPU memory awaiting GPU upload.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    /// Raw pixel data, tightly packed rows, top row first
    pub data: Vec<u8>,
    /// Layout of `data`
    pub format: PixelFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PixelBuffer {
    /// Size of the pixel data in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Errors that can occur while decoding a tile file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// File missing, unreadable, or not a decodable image
    #[error("failed to decode tile image: {0}")]
    Image(#[from] image::ImageError),
}

/// Trait for the tile decode primitive.
///
/// Implementations must be thread-safe (`Send + Sync`); the decode worker
/// calls them from a background thread.
pub trait TileDecoder: Send + Sync {
    /// Decode the tile file at `path` into a pixel buffer.
    ///
    /// `flip_vertical` inverts the row order for sources that deliver
    /// upside-down tiles.
    fn decode(&self, path: &Path, flip_vertical: bool) -> Result<PixelBuffer, DecodeError>;
}

/// Default decoder backed by the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct ImageTileDecoder;

impl ImageTileDecoder {
    /// Creates a new decoder.
    pub fn new() -> Self {
        Self
    }
}

impl TileDecoder for ImageTileDecoder {
    fn decode(&self, path: &Path, flip_vertical: bool) -> Result<PixelBuffer, DecodeError> {
        let mut image = image::open(path)?;

        if flip_vertical {
            image = image.flipv();
        }

        let width = image.width();
        let height = image.height();
        let color = image.color();

        let buffer = if color.has_alpha() {
            PixelBuffer {
                data: image.into_rgba8().into_raw(),
                format: PixelFormat::Rgba8888,
                width,
                height,
            }
        } else if matches!(image, DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_)) {
            // Grayscale tiles are masks: keep a single alpha channel
            PixelBuffer {
                data: image.into_luma8().into_raw(),
                format: PixelFormat::A8,
                width,
                height,
            }
        } else {
            PixelBuffer {
                data: pack_rgb565(&image.into_rgba8()),
                format: PixelFormat::Rgb565,
                width,
                height,
            }
        };

        trace!(
            path = %path.display(),
            format = %buffer.format,
            width = width,
            height = height,
            "tile decoded"
        );

        Ok(buffer)
    }
}

/// Repack RGBA pixels into little-endian RGB565.
///
/// Bit layout per pixel: red in bits 15-11, green in bits 10-5, blue in
/// bits 4-0.
fn pack_rgb565(rgba: &RgbaImage) -> Vec<u8> {
    let mut packed = Vec::with_capacity(rgba.pixels().len() * 2);

    for pixel in rgba.pixels() {
        let [r, g, b, _] = pixel.0;
        let value: u16 =
            (((r as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((b as u16) >> 3);
        packed.extend_from_slice(&value.to_le_bytes());
    }

    packed
}
