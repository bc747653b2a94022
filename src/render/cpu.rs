use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape;

use crate::assets::glyphs::BuiltinGlyph;
use crate::assets::image::ImageHandle;
use crate::assets::svg_raster::SvgRasterizer;
use crate::foundation::core::{Affine, Rect, Rgba8Premul};
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
use crate::scene::model::{AvatarLayer, ContentMode, DrawOp, Scene};
use crate::scene::placement::content_transform;

// Curve flattening tolerance for the clip circle and ring, in layout units.
const CIRCLE_TOLERANCE: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum RasterKey {
    Glyph {
        glyph: BuiltinGlyph,
        color: Rgba8Premul,
        px: u32,
    },
    Text {
        text: String,
        font_size_bits: u64,
        color: Rgba8Premul,
        w: u32,
        h: u32,
    },
}

#[derive(Clone)]
struct RasterPaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

/// Entries kept before the raster cache is flushed wholesale.
const RASTER_CACHE_CAP: usize = 512;

/// CPU raster backend powered by `vello_cpu`.
///
/// Glyphs and initials go through `resvg` once per size/color and are cached as image paints.
/// The cache is flushed once it holds 512 entries, so long-lived backends rendering many
/// identities stay bounded.
pub struct CpuBackend {
    settings: RenderSettings,
    ctx: Option<vello_cpu::RenderContext>,
    svg: SvgRasterizer,
    raster_cache: HashMap<RasterKey, RasterPaint>,
}

impl CpuBackend {
    /// Create a backend; loads fonts once.
    pub fn new(settings: RenderSettings) -> AvatarResult<Self> {
        settings.validate()?;
        let svg = SvgRasterizer::new(&settings.font_dirs, settings.font_family.as_deref());
        Ok(Self {
            settings,
            ctx: None,
            svg,
            raster_cache: HashMap::new(),
        })
    }

    /// Settings this backend was created with.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> AvatarResult<R>,
    ) -> AvatarResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn draw_layer(
        &mut self,
        layer: &AvatarLayer,
        base: Affine,
        ctx: &mut vello_cpu::RenderContext,
    ) -> AvatarResult<()> {
        let tr = base * Affine::translate(layer.offset);
        let circle = bezpath_to_cpu(&layer.clip_circle().to_path(CIRCLE_TOLERANCE));

        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(tr));
        ctx.push_clip_layer(&circle);
        for op in &layer.ops {
            self.draw_op(op, tr, ctx)?;
        }
        ctx.pop_layer();

        if layer.ring.width > 0.0 && layer.ring.color.a > 0 {
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(layer.ring.width));
            ctx.set_paint(paint_color(layer.ring.color));
            ctx.stroke_path(&circle);
        }
        Ok(())
    }

    fn draw_op(
        &mut self,
        op: &DrawOp,
        tr: Affine,
        ctx: &mut vello_cpu::RenderContext,
    ) -> AvatarResult<()> {
        match op {
            DrawOp::FillRect { rect, color } => {
                ctx.set_transform(affine_to_cpu(tr));
                ctx.set_paint(paint_color(*color));
                ctx.fill_rect(&rect_to_cpu(*rect));
            }
            DrawOp::Image {
                image,
                frame,
                mode,
                tint,
                opacity,
            } => {
                let image = match tint {
                    Some(t) => image.tinted(*t),
                    None => image.clone(),
                };
                let (w, h) = (image.width(), image.height());
                if w == 0 || h == 0 {
                    return Ok(());
                }
                let place = content_transform(f64::from(w), f64::from(h), *frame, *mode);
                fill_paint(ctx, tr * place, image_paint(&image)?, w, h, *opacity);
            }
            DrawOp::Glyph {
                glyph,
                frame,
                color,
                opacity,
            } => {
                let side = frame.width().min(frame.height());
                let px = self.device_px(side);
                if px == 0 {
                    return Ok(());
                }
                let key = RasterKey::Glyph {
                    glyph: *glyph,
                    color: *color,
                    px,
                };
                let raster = self.raster_for(key, |svg| svg.glyph(*glyph, *color, px, px))?;
                let place = content_transform(
                    f64::from(raster.w),
                    f64::from(raster.h),
                    *frame,
                    ContentMode::Fit,
                );
                fill_paint(ctx, tr * place, raster.paint, raster.w, raster.h, *opacity);
            }
            DrawOp::Text {
                text,
                frame,
                font_size,
                color,
            } => {
                if text.is_empty() {
                    return Ok(());
                }
                let (w, h) = (self.device_px(frame.width()), self.device_px(frame.height()));
                if w == 0 || h == 0 {
                    return Ok(());
                }
                let key = RasterKey::Text {
                    text: text.clone(),
                    font_size_bits: font_size.to_bits(),
                    color: *color,
                    w,
                    h,
                };
                let (lw, lh) = (frame.width(), frame.height());
                let raster = self.raster_for(key, |svg| {
                    svg.centered_text(text, *font_size, *color, lw, lh, w, h)
                })?;
                let place = content_transform(
                    f64::from(raster.w),
                    f64::from(raster.h),
                    *frame,
                    ContentMode::Fill,
                );
                fill_paint(ctx, tr * place, raster.paint, raster.w, raster.h, 1.0);
            }
        }
        Ok(())
    }

    fn device_px(&self, logical: f64) -> u32 {
        let px = (logical * self.settings.scale).ceil();
        if px.is_finite() && px > 0.0 {
            px.min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }

    fn raster_for(
        &mut self,
        key: RasterKey,
        rasterize: impl FnOnce(&SvgRasterizer) -> AvatarResult<Vec<u8>>,
    ) -> AvatarResult<RasterPaint> {
        if let Some(p) = self.raster_cache.get(&key) {
            return Ok(p.clone());
        }
        let (w, h) = match &key {
            RasterKey::Glyph { px, .. } => (*px, *px),
            RasterKey::Text { w, h, .. } => (*w, *h),
        };
        let bytes = rasterize(&self.svg)?;
        let out = RasterPaint {
            paint: rgba_premul_to_image(&bytes, w, h)?,
            w,
            h,
        };
        if self.raster_cache.len() >= RASTER_CACHE_CAP {
            tracing::debug!(entries = self.raster_cache.len(), "dropping glyph/initials rasters");
            self.raster_cache.clear();
        }
        self.raster_cache.insert(key, out.clone());
        Ok(out)
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip(self, scene), fields(layers = scene.layers.len()))]
    fn render_scene(&mut self, scene: &Scene) -> AvatarResult<FrameRGBA> {
        if scene.is_empty() {
            return Ok(FrameRGBA {
                width: 0,
                height: 0,
                data: Vec::new(),
                premultiplied: true,
            });
        }

        let bounds = scene.bounds();
        let width = self.device_px(bounds.width());
        let height = self.device_px(bounds.height());
        let w: u16 = width
            .try_into()
            .map_err(|_| AvatarError::render(format!("frame width {width} exceeds u16")))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| AvatarError::render(format!("frame height {height} exceeds u16")))?;
        if w == 0 || h == 0 {
            return Ok(FrameRGBA {
                width: 0,
                height: 0,
                data: Vec::new(),
                premultiplied: true,
            });
        }

        let base = Affine::scale(self.settings.scale)
            * Affine::translate((-bounds.x0, -bounds.y0));

        let clear = self.settings.clear_rgba;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.with_ctx_mut(w, h, |this, ctx| {
            // `render_to_pixmap` overwrites the target, so the clear color is painted first.
            if let Some([r, g, b, a]) = clear {
                ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(w),
                    f64::from(h),
                ));
            }
            for layer in scene.draw_order() {
                this.draw_layer(layer, base, ctx)?;
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;

        Ok(FrameRGBA {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn fill_paint(
    ctx: &mut vello_cpu::RenderContext,
    tr: Affine,
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
    opacity: f32,
) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(paint);
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn image_paint(image: &ImageHandle) -> AvatarResult<vello_cpu::Image> {
    rgba_premul_to_image(image.premul_rgba8(), image.width(), image.height())
}

fn paint_color(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    if c.a == 0 {
        return vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 0);
    }
    let a = u32::from(c.a);
    let unpremul = |v: u8| -> u8 { ((u32::from(v) * 255 + a / 2) / a).min(255) as u8 };
    vello_cpu::peniko::Color::from_rgba8(unpremul(c.r), unpremul(c.g), unpremul(c.b), c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &crate::foundation::core::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> AvatarResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| AvatarError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| AvatarError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(AvatarError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> AvatarResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
