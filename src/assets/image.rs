use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{AvatarError, AvatarResult};

/// Decoded raster image in premultiplied RGBA8 form.
///
/// Handles are cheap to clone and safe to send across threads; pixel storage is shared.
#[derive(Clone)]
pub struct ImageHandle {
    inner: Arc<PreparedImage>,
}

struct PreparedImage {
    width: u32,
    height: u32,
    rgba8_premul: Vec<u8>,
}

impl ImageHandle {
    /// Wrap already-premultiplied RGBA8 pixels.
    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> AvatarResult<Self> {
        if width == 0 || height == 0 {
            return Err(AvatarError::validation("image must be at least 1x1"));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8_premul.len() != expected {
            return Err(AvatarError::validation(format!(
                "image byte len mismatch: expected {expected}, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            inner: Arc::new(PreparedImage {
                width,
                height,
                rgba8_premul,
            }),
        })
    }

    /// Wrap straight-alpha RGBA8 pixels, premultiplying them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> AvatarResult<Self> {
        crate::assets::decode::premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul_rgba8(width, height, rgba8)
    }

    /// Single-color image, mostly useful for tests and synthetic placeholders.
    pub fn solid(width: u32, height: u32, color: Rgba8Premul) -> AvatarResult<Self> {
        let px = color.to_array();
        let count = (width as usize).saturating_mul(height as usize);
        let mut bytes = Vec::with_capacity(count.saturating_mul(4));
        for _ in 0..count {
            bytes.extend_from_slice(&px);
        }
        Self::from_premul_rgba8(width, height, bytes)
    }

    /// Decode encoded image bytes (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> AvatarResult<Self> {
        crate::assets::decode::decode_image(bytes)
    }

    /// Read and decode an image file.
    pub fn open(path: impl AsRef<Path>) -> AvatarResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        Self::decode(&bytes)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Pixel bytes in row-major premultiplied RGBA8.
    pub fn premul_rgba8(&self) -> &[u8] {
        &self.inner.rgba8_premul
    }

    /// Copy of this image with every pixel recolored to `tint`, keeping per-pixel coverage.
    ///
    /// This is template rendering: only the alpha channel of the source survives.
    pub fn tinted(&self, tint: Rgba8Premul) -> Self {
        use crate::foundation::math::mul_div255_u8;

        let mut out = Vec::with_capacity(self.inner.rgba8_premul.len());
        for px in self.inner.rgba8_premul.chunks_exact(4) {
            let a = u16::from(px[3]);
            out.push(mul_div255_u8(u16::from(tint.r), a));
            out.push(mul_div255_u8(u16::from(tint.g), a));
            out.push(mul_div255_u8(u16::from(tint.b), a));
            out.push(mul_div255_u8(u16::from(tint.a), a));
        }
        Self {
            inner: Arc::new(PreparedImage {
                width: self.inner.width,
                height: self.inner.height,
                rgba8_premul: out,
            }),
        }
    }

    /// `true` when both handles share the same pixel storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .field("ptr", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;
