//! Deterministic per-name styling: initials plus a background/text color pair.
//!
//! Colors are derived from a documented hash so that output is reproducible across runs,
//! platforms and reimplementations:
//!
//! 1. hash the UTF-8 bytes of the name with 64-bit FNV-1a and read the result as `i64`
//! 2. `hue = |hash| mod 360`
//! 3. background = `Hsb(hue, 0.5, 0.9)`, text = `Hsb(hue, 0.7, 0.3)`

use crate::foundation::color::Hsb;
use crate::foundation::math::Fnv1a64;

const BACKGROUND_SATURATION: f64 = 0.5;
const BACKGROUND_BRIGHTNESS: f64 = 0.9;
const TEXT_SATURATION: f64 = 0.7;
const TEXT_BRIGHTNESS: f64 = 0.3;

/// Stable string hash used for hue selection.
pub trait NameHasher {
    /// Hash `name`. Must be a pure function of its input.
    fn hash_name(&self, name: &str) -> i64;
}

/// Default [`NameHasher`]: 64-bit FNV-1a over UTF-8 bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fnv1aNameHasher;

impl NameHasher for Fnv1aNameHasher {
    fn hash_name(&self, name: &str) -> i64 {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(name.as_bytes());
        h.finish() as i64
    }
}

/// Full styling derived for one name.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentityStyle {
    /// One or two uppercase characters.
    pub initials: String,
    /// Fill behind the initials.
    pub background: Hsb,
    /// Initials color; same hue as `background`, darker.
    pub text: Hsb,
}

/// Maps display names to initials and colors.
#[derive(Clone, Debug, Default)]
pub struct IdentityStyler<H = Fnv1aNameHasher> {
    hasher: H,
}

impl IdentityStyler {
    /// Styler using the documented FNV-1a hash.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: NameHasher> IdentityStyler<H> {
    /// Styler using a caller-supplied hash.
    pub fn with_hasher(hasher: H) -> Self {
        Self { hasher }
    }

    /// Hue in degrees, `[0, 360)`.
    pub fn hue(&self, name: &str) -> f64 {
        (self.hasher.hash_name(name).unsigned_abs() % 360) as f64
    }

    /// Light fill color for `name`.
    pub fn background_color(&self, name: &str) -> Hsb {
        Hsb::new(self.hue(name), BACKGROUND_SATURATION, BACKGROUND_BRIGHTNESS)
    }

    /// Dark text color for `name`, in the same hue family as the background.
    pub fn text_color(&self, name: &str) -> Hsb {
        Hsb::new(self.hue(name), TEXT_SATURATION, TEXT_BRIGHTNESS)
    }

    /// Initials plus both colors.
    pub fn style(&self, name: &str) -> IdentityStyle {
        let hue = self.hue(name);
        IdentityStyle {
            initials: initials(name),
            background: Hsb::new(hue, BACKGROUND_SATURATION, BACKGROUND_BRIGHTNESS),
            text: Hsb::new(hue, TEXT_SATURATION, TEXT_BRIGHTNESS),
        }
    }
}

/// First letters of the first two whitespace-separated words, uppercased.
///
/// Falls back to the first two characters of the raw name when that yields fewer than two
/// characters; names shorter than two characters return what is available.
pub fn initials(name: &str) -> String {
    let from_words: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .collect::<String>()
        .to_uppercase();
    if from_words.chars().count() >= 2 {
        return from_words;
    }
    name.chars().take(2).collect::<String>().to_uppercase()
}

/// [`IdentityStyler::background_color`] with the default hash.
pub fn background_color(name: &str) -> Hsb {
    IdentityStyler::new().background_color(name)
}

/// [`IdentityStyler::text_color`] with the default hash.
pub fn text_color(name: &str) -> Hsb {
    IdentityStyler::new().text_color(name)
}

#[cfg(test)]
#[path = "../../tests/unit/identity/styler.rs"]
mod tests;
