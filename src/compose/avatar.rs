use std::time::Duration;

use crate::foundation::core::{Rect, Rgba8Premul, Vec2};
use crate::identity::styler::{IdentityStyler, NameHasher};
use crate::loader::fetch::ImageFetcher;
use crate::loader::mailbox::LoadMailbox;
use crate::loader::remote::{LoaderVisual, MountOptions, RemoteImageLoader, pending_artwork};
use crate::model::size::AvatarSize;
use crate::model::source::AvatarSource;
use crate::scene::model::{AvatarLayer, ContentMode, DrawOp, LayerRole, Ring, Scene};

/// Ring drawn around every avatar.
pub const RING: Ring = Ring {
    width: 1.0,
    color: Rgba8Premul {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    },
};

/// Background behind placeholder icons: system gray at 20% opacity, premultiplied.
pub const PLACEHOLDER_BACKGROUND: Rgba8Premul = Rgba8Premul {
    r: 28,
    g: 28,
    b: 29,
    a: 51,
};

/// Fraction of the diameter a placeholder icon is inset on each side.
pub const PLACEHOLDER_INSET: f64 = 0.3;

/// A single circular avatar. Pure value; nothing happens until [`Avatar::mount`].
#[derive(Clone, Debug, PartialEq)]
pub struct Avatar {
    source: AvatarSource,
    size: AvatarSize,
}

impl Avatar {
    /// Avatar showing `source` at `size`.
    pub fn new(source: AvatarSource, size: AvatarSize) -> Self {
        Self { source, size }
    }

    /// What the avatar shows.
    pub fn source(&self) -> &AvatarSource {
        &self.source
    }

    /// Diameter preset.
    pub fn size(&self) -> AvatarSize {
        self.size
    }

    /// Start a live instance; remote sources issue their fetch here.
    pub fn mount(
        &self,
        fetcher: &dyn ImageFetcher,
        mailbox: &LoadMailbox,
        options: MountOptions,
    ) -> MountedAvatar {
        MountedAvatar::mount(self.source.clone(), self.size, fetcher, mailbox, options)
    }

    /// Scene without mounting. Remote sources render their pending state.
    pub fn scene(&self) -> Scene {
        let layer = compose_layer(
            &self.source,
            self.size,
            None,
            &IdentityStyler::new(),
            LayerRole::Source { index: 0 },
        );
        single_layer_scene(layer, self.size)
    }
}

/// Live avatar: owns the remote loader, if any.
pub struct MountedAvatar {
    source: AvatarSource,
    size: AvatarSize,
    loader: Option<RemoteImageLoader>,
}

impl MountedAvatar {
    pub(crate) fn mount(
        source: AvatarSource,
        size: AvatarSize,
        fetcher: &dyn ImageFetcher,
        mailbox: &LoadMailbox,
        options: MountOptions,
    ) -> Self {
        let loader = match &source {
            AvatarSource::Remote(remote) => Some(RemoteImageLoader::start(
                remote.clone(),
                fetcher,
                mailbox,
                options,
            )),
            _ => None,
        };
        Self {
            source,
            size,
            loader,
        }
    }

    /// What the avatar shows.
    pub fn source(&self) -> &AvatarSource {
        &self.source
    }

    /// Remote loader, for remote sources.
    pub fn loader(&self) -> Option<&RemoteImageLoader> {
        self.loader.as_ref()
    }

    /// Changes whenever this avatar's load state changes; constant for non-remote sources.
    pub fn revision(&self) -> u64 {
        self.loader.as_ref().map_or(0, |l| l.cell().revision())
    }

    /// Whether [`MountedAvatar::advance`] still changes what this avatar shows.
    pub fn is_animating(&self) -> bool {
        self.loader.as_ref().is_some_and(RemoteImageLoader::is_animating)
    }

    /// Advance time-driven transitions.
    pub fn advance(&mut self, dt: Duration) {
        if let Some(loader) = &mut self.loader {
            loader.advance(dt);
        }
    }

    /// Current layer, at the origin with z 0.
    pub fn layer(&self) -> AvatarLayer {
        self.layer_with(&IdentityStyler::new(), LayerRole::Source { index: 0 })
    }

    /// Current layer using a custom identity styler.
    pub fn layer_with<H: NameHasher>(
        &self,
        styler: &IdentityStyler<H>,
        role: LayerRole,
    ) -> AvatarLayer {
        compose_layer(&self.source, self.size, self.loader.as_ref(), styler, role)
    }

    /// Current scene containing just this avatar.
    pub fn scene(&self) -> Scene {
        single_layer_scene(self.layer(), self.size)
    }
}

fn single_layer_scene(layer: AvatarLayer, size: AvatarSize) -> Scene {
    Scene {
        layers: vec![layer],
        height: size.diameter(),
    }
}

/// Compose one avatar's layer in its local space.
pub(crate) fn compose_layer<H: NameHasher>(
    source: &AvatarSource,
    size: AvatarSize,
    loader: Option<&RemoteImageLoader>,
    styler: &IdentityStyler<H>,
    role: LayerRole,
) -> AvatarLayer {
    let d = size.diameter();
    let frame = Rect::new(0.0, 0.0, d, d);

    let ops = match source {
        AvatarSource::Image(image) => vec![DrawOp::Image {
            image: image.clone(),
            frame,
            mode: ContentMode::Fill,
            tint: None,
            opacity: 1.0,
        }],
        AvatarSource::Remote(remote) => {
            let visual = match loader {
                Some(l) => l.visual(),
                None => LoaderVisual::Pending(pending_artwork(remote)),
            };
            visual.draw_ops(frame)
        }
        AvatarSource::Name(name) => {
            let style = styler.style(name);
            initials_ops(
                style.initials,
                frame,
                size.font_size(),
                style.background.to_rgba8_premul(),
                style.text.to_rgba8_premul(),
            )
        }
        AvatarSource::Placeholder(image) => {
            let inset = d * PLACEHOLDER_INSET;
            vec![
                DrawOp::FillRect {
                    rect: frame,
                    color: PLACEHOLDER_BACKGROUND,
                },
                DrawOp::Image {
                    image: image.clone(),
                    frame: Rect::new(inset, inset, d - inset, d - inset),
                    mode: ContentMode::Fit,
                    tint: Some(Rgba8Premul::white()),
                    opacity: 1.0,
                },
            ]
        }
    };

    AvatarLayer {
        role,
        offset: Vec2::ZERO,
        z: 0,
        diameter: d,
        ops,
        ring: RING,
    }
}

pub(crate) fn initials_ops(
    text: String,
    frame: Rect,
    font_size: f64,
    background: Rgba8Premul,
    color: Rgba8Premul,
) -> Vec<DrawOp> {
    vec![
        DrawOp::FillRect {
            rect: frame,
            color: background,
        },
        DrawOp::Text {
            text,
            frame,
            font_size,
            color,
        },
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/compose/avatar.rs"]
mod tests;
