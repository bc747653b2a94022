use crate::foundation::core::{Affine, Rect, Vec2};
use crate::scene::model::ContentMode;

/// Rect covered by content of size `w x h` placed in `frame` under `mode`, centered.
///
/// For [`ContentMode::Fill`] the result may extend past `frame`.
pub fn content_rect(w: f64, h: f64, frame: Rect, mode: ContentMode) -> Rect {
    if w <= 0.0 || h <= 0.0 || frame.width() <= 0.0 || frame.height() <= 0.0 {
        return Rect::from_origin_size(frame.center(), (0.0, 0.0));
    }
    let sx = frame.width() / w;
    let sy = frame.height() / h;
    let s = match mode {
        ContentMode::Fill => sx.max(sy),
        ContentMode::Fit => sx.min(sy),
    };
    let size = (w * s, h * s);
    let c = frame.center();
    Rect::from_origin_size((c.x - size.0 / 2.0, c.y - size.1 / 2.0), size)
}

/// Affine mapping content pixel space `(0,0)..(w,h)` onto [`content_rect`].
pub fn content_transform(w: f64, h: f64, frame: Rect, mode: ContentMode) -> Affine {
    let r = content_rect(w, h, frame, mode);
    if w <= 0.0 || h <= 0.0 {
        return Affine::translate(Vec2::new(r.x0, r.y0));
    }
    Affine::translate(Vec2::new(r.x0, r.y0)) * Affine::scale_non_uniform(r.width() / w, r.height() / h)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/placement.rs"]
mod tests;
