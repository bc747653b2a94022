use std::time::Duration;

use crate::animation::ease::Ease;
use crate::animation::fade::Fade;
use crate::assets::glyphs::BuiltinGlyph;
use crate::assets::image::ImageHandle;
use crate::foundation::core::{Rect, Rgba8Premul};
use crate::loader::fetch::ImageFetcher;
use crate::loader::mailbox::LoadMailbox;
use crate::loader::state::{LoadCell, LoadPhase, LoadState};
use crate::model::source::RemoteSource;
use crate::scene::model::{ContentMode, DrawOp};

/// Color of the default person/failure glyphs (system gray).
pub const GLYPH_COLOR: Rgba8Premul = Rgba8Premul {
    r: 142,
    g: 142,
    b: 147,
    a: 255,
};

/// Options applied when an avatar is mounted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MountOptions {
    /// Length of the placeholder-to-failure crossfade. Zero swaps immediately.
    pub failure_fade: Duration,
    /// Easing for that crossfade.
    pub fade_ease: Ease,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            failure_fade: Duration::from_millis(250),
            fade_ease: Ease::InOutQuad,
        }
    }
}

impl MountOptions {
    /// Return options with a different failure crossfade length.
    pub fn with_failure_fade(mut self, fade: Duration) -> Self {
        self.failure_fade = fade;
        self
    }
}

/// Image or glyph shown by the loader in a given state.
#[derive(Clone, Debug, PartialEq)]
pub enum Artwork {
    /// Caller-supplied image.
    Image(ImageHandle),
    /// Built-in default.
    Glyph(BuiltinGlyph),
}

/// What a remote avatar currently shows.
#[derive(Clone, Debug, PartialEq)]
pub enum LoaderVisual {
    /// Fetch pending: placeholder image or person glyph, aspect-fit.
    Pending(Artwork),
    /// Fetched image, aspect-fill.
    Loaded(ImageHandle),
    /// Crossfading from the pending artwork to the failure artwork.
    Failed {
        /// Artwork fading out.
        from: Artwork,
        /// Artwork fading in.
        to: Artwork,
        /// Eased crossfade progress in `[0, 1]`.
        progress: f64,
    },
}

/// Remote-URL adapter: one fetch per instance, tri-state outcome, fallback imagery.
pub struct RemoteImageLoader {
    source: RemoteSource,
    cell: LoadCell,
    options: MountOptions,
    fade: Option<Fade>,
}

impl RemoteImageLoader {
    /// Register with `mailbox` and issue the single fetch for `source`.
    pub fn start(
        source: RemoteSource,
        fetcher: &dyn ImageFetcher,
        mailbox: &LoadMailbox,
        options: MountOptions,
    ) -> Self {
        let cell = LoadCell::new();
        let completion = mailbox.register(&cell);
        tracing::debug!(url = %source.url, ticket = ?completion.ticket(), "fetching avatar image");
        fetcher.fetch(&source.url, completion);
        Self {
            source,
            cell,
            options,
            fade: None,
        }
    }

    /// Source this loader was started for.
    pub fn source(&self) -> &RemoteSource {
        &self.source
    }

    /// Observable state holder.
    pub fn cell(&self) -> &LoadCell {
        &self.cell
    }

    /// Current load phase.
    pub fn phase(&self) -> LoadPhase {
        self.cell.phase()
    }

    /// Drive the failure crossfade by `dt`. No effect in other states.
    pub fn advance(&mut self, dt: Duration) {
        if self.cell.phase() != LoadPhase::Failed {
            return;
        }
        let options = self.options;
        self.fade
            .get_or_insert_with(|| Fade::new(options.failure_fade, options.fade_ease))
            .advance(dt);
    }

    /// Whether the failure crossfade still needs [`RemoteImageLoader::advance`] ticks.
    ///
    /// True from the moment the load fails until the fade completes; the failure artwork is
    /// not fully visible before then.
    pub fn is_animating(&self) -> bool {
        if self.cell.phase() != LoadPhase::Failed {
            return false;
        }
        match &self.fade {
            Some(f) => !f.is_complete(),
            None => !self.options.failure_fade.is_zero(),
        }
    }

    /// Visual for the current state.
    pub fn visual(&self) -> LoaderVisual {
        match self.cell.state() {
            LoadState::Loading => LoaderVisual::Pending(self.pending_artwork()),
            LoadState::Loaded(image) => LoaderVisual::Loaded(image),
            LoadState::Failed => LoaderVisual::Failed {
                from: self.pending_artwork(),
                to: self.failure_artwork(),
                progress: self.fade_progress(),
            },
        }
    }

    fn fade_progress(&self) -> f64 {
        match &self.fade {
            Some(f) => f.progress(),
            None if self.options.failure_fade.is_zero() => 1.0,
            None => 0.0,
        }
    }

    fn pending_artwork(&self) -> Artwork {
        pending_artwork(&self.source)
    }

    fn failure_artwork(&self) -> Artwork {
        match &self.source.failure {
            Some(img) => Artwork::Image(img.clone()),
            None => Artwork::Glyph(BuiltinGlyph::Failure),
        }
    }
}

pub(crate) fn pending_artwork(source: &RemoteSource) -> Artwork {
    match &source.placeholder {
        Some(img) => Artwork::Image(img.clone()),
        None => Artwork::Glyph(BuiltinGlyph::Person),
    }
}

impl LoaderVisual {
    /// Draw ops covering `frame`.
    pub(crate) fn draw_ops(&self, frame: Rect) -> Vec<DrawOp> {
        match self {
            Self::Pending(art) => vec![artwork_op(art, frame, 1.0)],
            Self::Loaded(image) => vec![DrawOp::Image {
                image: image.clone(),
                frame,
                mode: ContentMode::Fill,
                tint: None,
                opacity: 1.0,
            }],
            Self::Failed { from, to, progress } => {
                let t = progress.clamp(0.0, 1.0) as f32;
                let mut ops = Vec::with_capacity(2);
                if t < 1.0 {
                    ops.push(artwork_op(from, frame, 1.0 - t));
                }
                ops.push(artwork_op(to, frame, t));
                ops
            }
        }
    }
}

fn artwork_op(art: &Artwork, frame: Rect, opacity: f32) -> DrawOp {
    match art {
        Artwork::Image(image) => DrawOp::Image {
            image: image.clone(),
            frame,
            mode: ContentMode::Fit,
            tint: None,
            opacity,
        },
        Artwork::Glyph(glyph) => DrawOp::Glyph {
            glyph: *glyph,
            frame,
            color: GLYPH_COLOR,
            opacity,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/remote.rs"]
mod tests;
