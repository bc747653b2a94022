use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use url::Url;

use crate::assets::image::ImageHandle;
use crate::compose::group::{AvatarGroup, DEFAULT_LIMIT};
use crate::foundation::color::parse_hex;
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::model::size::AvatarSize;
use crate::model::source::{AvatarSource, RemoteSource};

/// JSON description of an avatar group.
///
/// Relative image paths and relative remote locations resolve against [`GroupSpec::base_dir`],
/// which [`GroupSpec::from_path`] sets to the directory holding the file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    /// Diameter preset.
    #[serde(default)]
    pub size: AvatarSize,
    /// Visible source count; may be zero or negative.
    #[serde(default = "default_limit")]
    pub limit: i32,
    /// Show a marker when some sources are hidden.
    #[serde(default)]
    pub show_overflow: bool,
    /// Canvas color behind the group, `#RRGGBB` or `#RRGGBBAA`. Transparent when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Sources in display-input order.
    pub sources: Vec<SourceSpec>,
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_limit() -> i32 {
    DEFAULT_LIMIT
}

/// One entry of [`GroupSpec::sources`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSpec {
    /// Display name rendered as initials.
    Name(String),
    /// Image file.
    Image(PathBuf),
    /// Remote location fetched after mount.
    Remote(RemoteSpec),
    /// Icon file drawn as a tinted placeholder.
    Placeholder(PathBuf),
}

/// Remote source entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteSpec {
    /// Absolute URL, or a path relative to the description file.
    pub url: String,
    /// Image file shown while pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<PathBuf>,
    /// Image file shown after failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<PathBuf>,
}

impl GroupSpec {
    /// Parse a description from a JSON reader. Relative paths resolve against the working directory.
    pub fn from_reader<R: std::io::Read>(r: R) -> AvatarResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| AvatarError::serde(format!("parse group description JSON: {e}")))
    }

    /// Parse a description from a JSON string.
    pub fn from_json_str(s: &str) -> AvatarResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a description file; relative paths resolve against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> AvatarResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            AvatarError::validation(format!("open group description '{}': {e}", path.display()))
        })?;
        let spec = Self::from_reader(BufReader::new(f))?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(spec.with_base_dir(base))
    }

    /// Set the directory relative paths resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Directory relative paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Parsed [`GroupSpec::background`] as straight RGBA8, ready for
    /// [`crate::RenderSettings::clear_rgba`].
    pub fn background_rgba(&self) -> AvatarResult<Option<[u8; 4]>> {
        self.background
            .as_deref()
            .map(|s| parse_hex(s).map_err(|e| AvatarError::validation(format!("background: {e}"))))
            .transpose()
    }

    /// Load referenced images and build the group.
    #[tracing::instrument(skip(self), fields(base_dir = %self.base_dir.display()))]
    pub fn build(&self) -> AvatarResult<AvatarGroup> {
        let sources = self
            .sources
            .iter()
            .map(|s| self.resolve_source(s))
            .collect::<AvatarResult<Vec<_>>>()?;
        Ok(AvatarGroup::new(sources, self.size)
            .limit(self.limit)
            .show_overflow(self.show_overflow))
    }

    fn resolve_source(&self, spec: &SourceSpec) -> AvatarResult<AvatarSource> {
        Ok(match spec {
            SourceSpec::Name(name) => AvatarSource::Name(name.clone()),
            SourceSpec::Image(path) => AvatarSource::Image(self.open_image(path)?),
            SourceSpec::Placeholder(path) => AvatarSource::Placeholder(self.open_image(path)?),
            SourceSpec::Remote(remote) => {
                let mut source = RemoteSource::new(self.resolve_url(&remote.url)?);
                if let Some(p) = &remote.placeholder {
                    source = source.placeholder(self.open_image(p)?);
                }
                if let Some(p) = &remote.failure {
                    source = source.failure(self.open_image(p)?);
                }
                AvatarSource::Remote(source)
            }
        })
    }

    fn open_image(&self, path: &Path) -> AvatarResult<ImageHandle> {
        ImageHandle::open(self.base_dir.join(path))
    }

    fn resolve_url(&self, raw: &str) -> AvatarResult<Url> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let abs = std::path::absolute(self.base_dir.join(raw)).map_err(|e| {
                    AvatarError::validation(format!("resolve remote path '{raw}': {e}"))
                })?;
                Url::from_file_path(&abs).map_err(|()| {
                    AvatarError::validation(format!(
                        "remote path '{}' is not representable as a file URL",
                        abs.display()
                    ))
                })
            }
            Err(e) => Err(AvatarError::validation(format!("remote url '{raw}': {e}"))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/spec.rs"]
mod tests;
