use url::Url;

use crate::assets::image::ImageHandle;

/// What an avatar shows.
#[derive(Clone, Debug, PartialEq)]
pub enum AvatarSource {
    /// In-memory or bundled image, scaled to fill the circle.
    Image(ImageHandle),
    /// Image fetched from a URL after mount, with optional interim and fallback imagery.
    Remote(RemoteSource),
    /// Display name rendered as colored initials.
    Name(String),
    /// Icon drawn small and tinted over a neutral background.
    Placeholder(ImageHandle),
}

impl AvatarSource {
    /// [`AvatarSource::Name`] from anything string-like.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// [`AvatarSource::Remote`] without placeholder or failure imagery.
    pub fn remote(url: Url) -> Self {
        Self::Remote(RemoteSource::new(url))
    }
}

/// URL plus the imagery shown while pending and after failure.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteSource {
    /// Location of the image.
    pub url: Url,
    /// Shown while the fetch is pending. Defaults to a person glyph.
    pub placeholder: Option<ImageHandle>,
    /// Shown after the fetch failed. Defaults to a failure glyph.
    pub failure: Option<ImageHandle>,
}

impl RemoteSource {
    /// Remote source with default placeholder and failure glyphs.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            placeholder: None,
            failure: None,
        }
    }

    /// Set the pending-state image.
    pub fn placeholder(mut self, image: ImageHandle) -> Self {
        self.placeholder = Some(image);
        self
    }

    /// Set the failed-state image.
    pub fn failure(mut self, image: ImageHandle) -> Self {
        self.failure = Some(image);
        self
    }
}

impl From<RemoteSource> for AvatarSource {
    fn from(value: RemoteSource) -> Self {
        Self::Remote(value)
    }
}
