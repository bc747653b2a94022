use crate::foundation::core::Rgba8Premul;

/// Color in hue/saturation/brightness form (HSV), straight alpha.
///
/// `hue` is in degrees; saturation, brightness and alpha are normalized to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Hsb {
    /// Hue in degrees, `[0, 360)`.
    pub hue: f64,
    /// Saturation, `[0, 1]`.
    pub saturation: f64,
    /// Brightness (value), `[0, 1]`.
    pub brightness: f64,
    /// Straight alpha, `[0, 1]`.
    pub alpha: f64,
}

impl Hsb {
    /// Opaque color from hue (degrees), saturation and brightness.
    pub fn new(hue: f64, saturation: f64, brightness: f64) -> Self {
        Self {
            hue,
            saturation,
            brightness,
            alpha: 1.0,
        }
    }

    /// Straight-alpha RGB channels in `[0, 1]`.
    pub fn to_rgb(self) -> [f64; 3] {
        hsb_to_rgb(self.hue, self.saturation, self.brightness)
    }

    /// Convert to premultiplied RGBA8.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let [r, g, b] = self.to_rgb();
        Rgba8Premul::from_straight_rgba(to_u8(r), to_u8(g), to_u8(b), to_u8(self.alpha))
    }
}

fn hsb_to_rgb(h: f64, s: f64, v: f64) -> [f64; 3] {
    // Standard HSV -> RGB conversion (sRGB space, normalized inputs).
    let h = if h.is_finite() {
        (h % 360.0 + 360.0) % 360.0
    } else {
        0.0
    };
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    if s == 0.0 {
        return [v, v, v];
    }

    let sector = h / 60.0;
    let i = sector.floor();
    let f = sector - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match i as u32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Parse `#RRGGBB` / `#RRGGBBAA` into straight RGBA8.
pub(crate) fn parse_hex(s: &str) -> Result<[u8; 4], String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }

    let (r, g, b, a) = match s.len() {
        6 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ),
        _ => {
            return Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned());
        }
    };

    Ok([r, g, b, a])
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
