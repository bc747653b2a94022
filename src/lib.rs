//! avatar-kit renders circular avatars and stacked avatar groups.
//!
//! Widgets are pure values that compose into a backend-agnostic [`Scene`]:
//!
//! - Build an [`Avatar`] or [`AvatarGroup`] from [`AvatarSource`]s
//! - [`Avatar::mount`] / [`AvatarGroup::mount`] to start remote fetches through an [`ImageFetcher`]
//! - Pump the [`LoadMailbox`] on the owning thread, then rasterize with a [`RenderBackend`]
//! - While [`MountedGroup::is_animating`], keep calling [`MountedGroup::advance`] and re-render
//!
//! Name sources are styled deterministically: initials plus a hue derived from a documented
//! FNV-1a hash (see [`IdentityStyler`]).
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod foundation;

pub(crate) mod animation;
pub(crate) mod assets;
pub(crate) mod compose;
pub(crate) mod identity;
pub(crate) mod loader;
pub(crate) mod model;
pub(crate) mod render;
pub(crate) mod scene;

pub use crate::foundation::color::Hsb;
pub use crate::foundation::core::{Affine, BezPath, Circle, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{AvatarError, AvatarResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::fade::Fade;
pub use crate::assets::glyphs::BuiltinGlyph;
pub use crate::assets::image::ImageHandle;
pub use crate::compose::avatar::{
    Avatar, MountedAvatar, PLACEHOLDER_BACKGROUND, PLACEHOLDER_INSET, RING,
};
pub use crate::compose::group::{
    AvatarGroup, DEFAULT_LIMIT, GroupLayout, GroupSlot, MountedGroup, OVERFLOW_BACKGROUND,
    OVERFLOW_TEXT, OVERLAP, layout_group,
};
pub use crate::identity::styler::{
    Fnv1aNameHasher, IdentityStyle, IdentityStyler, NameHasher, background_color, initials,
    text_color,
};
#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub use crate::loader::fetch::{HttpFetcher, HttpFetcherOpts, HttpTransport};
pub use crate::loader::fetch::{
    ByteTransport, FetchError, FetchOutcome, FileFetcher, ImageFetcher, PooledFetcher,
};
pub use crate::loader::mailbox::{Completion, LoadMailbox, Ticket};
pub use crate::loader::remote::{
    Artwork, GLYPH_COLOR, LoaderVisual, MountOptions, RemoteImageLoader,
};
pub use crate::loader::state::{LoadCell, LoadPhase, LoadState};
pub use crate::model::size::AvatarSize;
pub use crate::model::source::{AvatarSource, RemoteSource};
pub use crate::model::spec::{GroupSpec, RemoteSpec, SourceSpec};
pub use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
pub use crate::render::cpu::CpuBackend;
pub use crate::scene::model::{AvatarLayer, ContentMode, DrawOp, LayerRole, Ring, Scene};
pub use crate::scene::placement::{content_rect, content_transform};
