//! Backend-agnostic display list produced by the avatar and group compositors.
//!
//! All geometry is in layout units. Each [`AvatarLayer`] has its own local space with the
//! avatar's square at `(0, 0)..(d, d)`; `offset` places that space in the scene.

use crate::assets::glyphs::BuiltinGlyph;
use crate::assets::image::ImageHandle;
use crate::foundation::core::{Circle, Point, Rect, Rgba8Premul, Vec2};

/// How an image maps onto its frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    /// Preserve aspect, cover the whole frame (overflow is clipped by the avatar circle).
    Fill,
    /// Preserve aspect, fit entirely inside the frame.
    Fit,
}

/// Drawing primitive inside an avatar layer.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Solid rectangle.
    FillRect {
        /// Rectangle in layer space.
        rect: Rect,
        /// Fill color.
        color: Rgba8Premul,
    },
    /// Raster image.
    Image {
        /// Pixels to draw.
        image: ImageHandle,
        /// Target frame in layer space.
        frame: Rect,
        /// Aspect handling.
        mode: ContentMode,
        /// Template color replacing the image's own colors.
        tint: Option<Rgba8Premul>,
        /// Layer opacity in `[0, 1]`.
        opacity: f32,
    },
    /// Built-in vector glyph, always aspect-fit.
    Glyph {
        /// Which glyph.
        glyph: BuiltinGlyph,
        /// Target frame in layer space.
        frame: Rect,
        /// Fill color.
        color: Rgba8Premul,
        /// Layer opacity in `[0, 1]`.
        opacity: f32,
    },
    /// Single line of text centered in `frame`.
    Text {
        /// Text content.
        text: String,
        /// Target frame in layer space.
        frame: Rect,
        /// Font size in layout units.
        font_size: f64,
        /// Text color.
        color: Rgba8Premul,
    },
}

/// Border stroked over the clipped avatar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    /// Stroke width in layout units, centered on the circle edge.
    pub width: f64,
    /// Stroke color.
    pub color: Rgba8Premul,
}

/// What a layer stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerRole {
    /// A caller-supplied source; `index` is its position in the input sequence.
    Source {
        /// Position in the caller's sequence.
        index: usize,
    },
    /// Synthetic marker for hidden sources.
    Overflow,
}

/// One circular avatar: ops clipped to a circle, then ringed.
#[derive(Clone, Debug, PartialEq)]
pub struct AvatarLayer {
    /// What this layer stands for.
    pub role: LayerRole,
    /// Translation of the layer's local space within the scene.
    pub offset: Vec2,
    /// Stacking order; higher draws later (on top).
    pub z: i32,
    /// Circle diameter.
    pub diameter: f64,
    /// Content, drawn in order, clipped to the circle.
    pub ops: Vec<DrawOp>,
    /// Border drawn after clipping.
    pub ring: Ring,
}

impl AvatarLayer {
    /// Clip circle in layer space.
    pub fn clip_circle(&self) -> Circle {
        let r = self.diameter / 2.0;
        Circle::new(Point::new(r, r), r)
    }

    /// Scene-space bounds, including the outer half of the ring stroke.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.diameter, self.diameter)
            .inflate(self.ring.width / 2.0, self.ring.width / 2.0)
            + self.offset
    }
}

/// A composed avatar or avatar group.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Layers in composition order (not paint order; see [`Scene::draw_order`]).
    pub layers: Vec<AvatarLayer>,
    /// Nominal height: one avatar diameter.
    pub height: f64,
}

impl Scene {
    /// Scene with no layers.
    pub fn empty(height: f64) -> Self {
        Self {
            layers: Vec::new(),
            height,
        }
    }

    /// `true` when nothing would be drawn.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers sorted bottom-to-top by `z`. Equal `z` keeps composition order.
    pub fn draw_order(&self) -> Vec<&AvatarLayer> {
        let mut out: Vec<&AvatarLayer> = self.layers.iter().collect();
        out.sort_by_key(|l| l.z);
        out
    }

    /// Union of layer bounds. Empty scenes are a zero-width rect of nominal height.
    pub fn bounds(&self) -> Rect {
        let mut layers = self.layers.iter();
        let Some(first) = layers.next() else {
            return Rect::new(0.0, 0.0, 0.0, self.height);
        };
        layers.fold(first.bounds(), |acc, l| acc.union(l.bounds()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
