use crate::foundation::core::Rgba8Premul;

/// Vector glyphs shipped with the crate, drawn when the caller supplies no imagery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinGlyph {
    /// Head-and-shoulders silhouette shown while a remote image is pending.
    Person,
    /// Exclamation mark in a disc shown after a remote image failed to load.
    Failure,
}

impl BuiltinGlyph {
    /// Path data in a 24x24 view box.
    pub(crate) fn path_data(self) -> &'static str {
        match self {
            Self::Person => {
                "M12 12c2.21 0 4-1.79 4-4s-1.79-4-4-4-4 1.79-4 4 1.79 4 4 4zm0 2c-2.67 0-8 1.34-8 4v2h16v-2c0-2.66-5.33-4-8-4z"
            }
            Self::Failure => {
                "M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm1 15h-2v-2h2v2zm0-4h-2V7h2v6z"
            }
        }
    }

    /// Standalone SVG document filled with `color`.
    pub(crate) fn svg_document(self, color: Rgba8Premul) -> String {
        let (rgb, opacity) = straight_rgb_hex(color);
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path fill="{rgb}" fill-opacity="{opacity:.4}" d="{d}"/></svg>"##,
            d = self.path_data()
        )
    }
}

/// Un-premultiply into an SVG `#rrggbb` string plus opacity.
pub(crate) fn straight_rgb_hex(c: Rgba8Premul) -> (String, f64) {
    if c.a == 0 {
        return ("#000000".to_owned(), 0.0);
    }
    let unpremul = |v: u8| -> u8 {
        ((u32::from(v) * 255 + u32::from(c.a) / 2) / u32::from(c.a)).min(255) as u8
    };
    (
        format!(
            "#{:02x}{:02x}{:02x}",
            unpremul(c.r),
            unpremul(c.g),
            unpremul(c.b)
        ),
        f64::from(c.a) / 255.0,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/assets/glyphs.rs"]
mod tests;
