use std::path::PathBuf;

use crate::foundation::error::{AvatarError, AvatarResult};
use crate::scene::model::Scene;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** by default. The `premultiplied` flag makes this explicit
/// at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Copy of the pixels with straight (non-premultiplied) alpha, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 {
                px[..3].fill(0);
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// A renderer that rasterizes a composed [`Scene`] into a [`FrameRGBA`].
pub trait RenderBackend {
    /// Rasterize `scene`. The frame covers [`Scene::bounds`] scaled by the backend's pixel ratio.
    fn render_scene(&mut self, scene: &Scene) -> AvatarResult<FrameRGBA>;
}

/// Backend-agnostic settings.
#[derive(Clone, Debug)]
pub struct RenderSettings {
    /// If set, backends clear the target to this straight RGBA8 color before drawing.
    pub clear_rgba: Option<[u8; 4]>,
    /// Device pixels per layout unit.
    pub scale: f64,
    /// Extra directories searched for `.ttf`/`.otf`/`.ttc` fonts, after system fonts.
    pub font_dirs: Vec<PathBuf>,
    /// Preferred family for initials. Falls back to sans-serif.
    pub font_family: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_rgba: None,
            scale: 1.0,
            font_dirs: Vec::new(),
            font_family: None,
        }
    }
}

impl RenderSettings {
    /// Return settings with a configured clear color.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }

    /// Return settings with a different pixel ratio.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Return settings with one more font directory.
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    /// Return settings with a preferred font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub(crate) fn validate(&self) -> AvatarResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(AvatarError::validation(format!(
                "render scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
