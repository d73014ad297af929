//! GPU texture upload boundary.
//!
//! The cache never talks to the GPU directly: the renderer supplies a
//! [`TextureUploader`] wrapping its GL context, and the façade calls it only
//! from the renderer's own thread. The crate defines the seam; the GL
//! implementation lives with the renderer.

use crate::decode::PixelBuffer;
use std::fmt;
use std::sync::Arc;

/// Opaque handle to a texture resident in GPU memory.
///
/// Handles are issued by the uploader and remain valid until passed back to
/// [`TextureUploader::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// Wrap a raw texture id.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw texture id, for handing to the rendering API.
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture#{}", self.0)
    }
}

/// Trait for the GPU texture upload primitive.
///
/// # Threading
///
/// `upload` and `delete` are only ever invoked from the thread that calls
/// [`TileRepo::get_texture`](crate::repo::TileRepo::get_texture) and
/// [`TileRepo::free_memory`](crate::repo::TileRepo::free_memory), which is
/// the renderer thread owning the GPU context. The `Send + Sync` bound exists so
/// the façade itself stays movable across threads.
pub trait TextureUploader: Send + Sync {
    /// Upload a decoded pixel buffer, returning its handle.
    ///
    /// Returns `None` if the GPU rejected the allocation; the tile then
    /// degrades to "not ready" and will be re-decoded on a later request.
    fn upload(&self, buffer: &PixelBuffer) -> Option<TextureHandle>;

    /// Release the GPU memory behind a handle.
    fn delete(&self, handle: TextureHandle);
}

/// Blanket implementation for Arc-wrapped uploaders, so a renderer can share
/// one uploader between the cache and its own bookkeeping.
impl<T: TextureUploader + ?Sized> TextureUploader for Arc<T> {
    fn upload(&self, buffer: &PixelBuffer) -> Option<TextureHandle> {
        (**self).upload(buffer)
    }

    fn delete(&self, handle: TextureHandle) {
        (**self).delete(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::PixelFormat;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingUploader {
        next: AtomicU32,
    }

    impl TextureUploader for CountingUploader {
        fn upload(&self, _buffer: &PixelBuffer) -> Option<TextureHandle> {
            Some(TextureHandle::new(self.next.fetch_add(1, Ordering::SeqCst)))
        }

        fn delete(&self, _handle: TextureHandle) {}
    }

    fn test_buffer() -> PixelBuffer {
        PixelBuffer {
            data: vec![0u8; 4],
            format: PixelFormat::Rgba8888,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_handle_identity() {
        let a = TextureHandle::new(7);
        let b = TextureHandle::new(7);
        let c = TextureHandle::new(8);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.id(), 7);
        assert_eq!(a.to_string(), "texture#7");
    }

    #[test]
    fn test_arc_wrapped_uploader_delegates() {
        let uploader = Arc::new(CountingUploader {
            next: AtomicU32::new(1),
        });

        let first = uploader.upload(&test_buffer()).unwrap();
        let second = uploader.upload(&test_buffer()).unwrap();

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
    }
}
