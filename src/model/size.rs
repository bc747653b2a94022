/// Avatar diameter presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvatarSize {
    /// 80 units.
    Large,
    /// 48 units.
    #[default]
    Medium,
    /// 24 units.
    Small,
    /// 20 units.
    ExtraSmall,
    /// Arbitrary diameter. Negative or non-finite values collapse to 0.
    Custom(f64),
}

impl AvatarSize {
    /// Circle diameter in layout units.
    pub fn diameter(self) -> f64 {
        match self {
            Self::Large => 80.0,
            Self::Medium => 48.0,
            Self::Small => 24.0,
            Self::ExtraSmall => 20.0,
            Self::Custom(d) => {
                if d.is_finite() && d > 0.0 {
                    d
                } else {
                    0.0
                }
            }
        }
    }

    /// Font size used for initials.
    pub fn font_size(self) -> f64 {
        match self {
            Self::Large => 32.0,
            Self::Medium => 18.0,
            Self::Small => 10.0,
            Self::ExtraSmall => 8.0,
            Self::Custom(_) => self.diameter() * 0.5,
        }
    }
}

impl std::str::FromStr for AvatarSize {
    type Err = String;

    /// Preset name (`large`, `medium`, `small`, `extra_small`) or a custom diameter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "large" => Ok(Self::Large),
            "medium" => Ok(Self::Medium),
            "small" => Ok(Self::Small),
            "extra_small" | "extra-small" => Ok(Self::ExtraSmall),
            other => other.parse::<f64>().map(Self::Custom).map_err(|_| {
                format!(
                    "unknown avatar size \"{s}\" (expected large, medium, small, extra_small or a number)"
                )
            }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/size.rs"]
mod tests;
