use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::assets::glyphs::{BuiltinGlyph, straight_rgb_hex};
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{AvatarError, AvatarResult};

// Avoid pathological allocations from huge custom sizes or scale factors.
const MAX_DIM: u32 = 16_384;

/// Rasterizes built-in glyphs and initials text through `usvg`/`resvg`.
///
/// Owns the font database so system font discovery happens once per backend, not per draw.
pub(crate) struct SvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
    font_family: String,
}

impl SvgRasterizer {
    pub(crate) fn new(font_dirs: &[PathBuf], font_family: Option<&str>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        if db.is_empty() {
            tracing::warn!("no fonts found; initials will not be drawn");
        }
        Self {
            fontdb: Arc::new(db),
            font_family: font_family.unwrap_or("sans-serif").to_owned(),
        }
    }

    fn options(&self) -> usvg::Options<'static> {
        usvg::Options {
            fontdb: self.fontdb.clone(),
            font_family: self.font_family.clone(),
            font_resolver: make_font_resolver(),
            ..Default::default()
        }
    }

    /// Rasterize `glyph` stretched over a `width x height` pixel buffer.
    pub(crate) fn glyph(
        &self,
        glyph: BuiltinGlyph,
        color: Rgba8Premul,
        width: u32,
        height: u32,
    ) -> AvatarResult<Vec<u8>> {
        let doc = glyph.svg_document(color);
        let tree = usvg::Tree::from_data(doc.as_bytes(), &self.options())
            .context("parse builtin glyph svg")?;
        rasterize_svg_to_premul_rgba8(&tree, width, height)
    }

    /// Rasterize `text` centered in a `logical_w x logical_h` box, output at `width x height`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn centered_text(
        &self,
        text: &str,
        font_size: f64,
        color: Rgba8Premul,
        logical_w: f64,
        logical_h: f64,
        width: u32,
        height: u32,
    ) -> AvatarResult<Vec<u8>> {
        let (rgb, opacity) = straight_rgb_hex(color);
        let doc = format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><text x="{cx}" y="{cy}" font-family="{family}" font-size="{font_size}" text-anchor="middle" dominant-baseline="central" fill="{rgb}" fill-opacity="{opacity:.4}">{body}</text></svg>"##,
            w = logical_w,
            h = logical_h,
            cx = logical_w / 2.0,
            cy = logical_h / 2.0,
            family = escape_xml(&self.font_family),
            body = escape_xml(text),
        );
        let tree = usvg::Tree::from_data(doc.as_bytes(), &self.options())
            .context("parse initials text svg")?;
        rasterize_svg_to_premul_rgba8(&tree, width, height)
    }
}

/// Rasterize a parsed tree scaled to fill `width x height`, returning premultiplied RGBA8.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> AvatarResult<Vec<u8>> {
    if width > MAX_DIM || height > MAX_DIM {
        return Err(AvatarError::render(format!(
            "svg raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| AvatarError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to load font");
        }
    }
}

fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style: usvg::fontdb::Style::Normal,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            // Any face beats dropping the initials entirely.
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
