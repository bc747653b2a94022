use std::cell::RefCell;

use url::Url;

use super::*;
use crate::loader::fetch::{FetchError, FetchOutcome};
use crate::loader::mailbox::Completion;

/// Holds completions until the test decides how they resolve.
#[derive(Default)]
struct ManualFetcher {
    issued: RefCell<Vec<(Url, Completion)>>,
}

impl ManualFetcher {
    fn finish_next(&self, outcome: FetchOutcome) {
        let (_, completion) = self.issued.borrow_mut().remove(0);
        completion.complete(outcome);
    }
}

impl ImageFetcher for ManualFetcher {
    fn fetch(&self, url: &Url, completion: Completion) {
        self.issued.borrow_mut().push((url.clone(), completion));
    }
}

fn source() -> RemoteSource {
    RemoteSource::new(Url::parse("https://example.com/u/1.png").unwrap())
}

fn pixel() -> ImageHandle {
    ImageHandle::solid(1, 1, Rgba8Premul::white()).unwrap()
}

#[test]
fn issues_exactly_one_fetch_and_starts_pending() {
    let fetcher = ManualFetcher::default();
    let mailbox = LoadMailbox::new();
    let loader = RemoteImageLoader::start(source(), &fetcher, &mailbox, MountOptions::default());

    assert_eq!(fetcher.issued.borrow().len(), 1);
    assert_eq!(fetcher.issued.borrow()[0].0.as_str(), "https://example.com/u/1.png");
    assert_eq!(loader.phase(), LoadPhase::Loading);
    assert_eq!(
        loader.visual(),
        LoaderVisual::Pending(Artwork::Glyph(BuiltinGlyph::Person))
    );
}

#[test]
fn custom_placeholder_is_shown_while_pending() {
    let fetcher = ManualFetcher::default();
    let mailbox = LoadMailbox::new();
    let ph = pixel();
    let loader = RemoteImageLoader::start(
        source().placeholder(ph.clone()),
        &fetcher,
        &mailbox,
        MountOptions::default(),
    );
    let ops = loader.visual().draw_ops(Rect::new(0.0, 0.0, 48.0, 48.0));
    assert_eq!(ops.len(), 1);
    assert!(matches!(
        &ops[0],
        DrawOp::Image { image, mode: ContentMode::Fit, opacity, .. } if *image == ph && *opacity == 1.0
    ));
}

#[test]
fn success_shows_fetched_image_filled() {
    let fetcher = ManualFetcher::default();
    let mailbox = LoadMailbox::new();
    let loader = RemoteImageLoader::start(source(), &fetcher, &mailbox, MountOptions::default());

    let img = pixel();
    fetcher.finish_next(Ok(img.clone()));
    mailbox.pump();

    assert_eq!(loader.visual(), LoaderVisual::Loaded(img.clone()));
    let ops = loader.visual().draw_ops(Rect::new(0.0, 0.0, 20.0, 20.0));
    assert!(matches!(
        &ops[0],
        DrawOp::Image { mode: ContentMode::Fill, .. }
    ));
}

#[test]
fn failure_crossfades_to_failure_glyph_and_sticks() {
    let fetcher = ManualFetcher::default();
    let mailbox = LoadMailbox::new();
    let mut loader = RemoteImageLoader::start(
        source(),
        &fetcher,
        &mailbox,
        MountOptions::default().with_failure_fade(Duration::from_millis(200)),
    );

    fetcher.finish_next(Err(FetchError::Network("reset".into())));
    mailbox.pump();
    assert_eq!(loader.phase(), LoadPhase::Failed);

    let frame = Rect::new(0.0, 0.0, 48.0, 48.0);
    let ops = loader.visual().draw_ops(frame);
    assert_eq!(ops.len(), 2);
    assert!(matches!(ops[0], DrawOp::Glyph { glyph: BuiltinGlyph::Person, opacity, .. } if opacity == 1.0));
    assert!(matches!(ops[1], DrawOp::Glyph { glyph: BuiltinGlyph::Failure, opacity, .. } if opacity == 0.0));

    loader.advance(Duration::from_millis(500));
    let ops = loader.visual().draw_ops(frame);
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], DrawOp::Glyph { glyph: BuiltinGlyph::Failure, opacity, .. } if opacity == 1.0));

    // A late success for the same instance cannot undo the failure.
    assert!(!loader.cell().resolve(Ok(pixel())));
    assert!(!loader.cell().resolve(Err(FetchError::Timeout)));
    assert_eq!(loader.phase(), LoadPhase::Failed);
}

#[test]
fn zero_fade_swaps_immediately_to_custom_failure_image() {
    let fetcher = ManualFetcher::default();
    let mailbox = LoadMailbox::new();
    let fail_img = pixel();
    let loader = RemoteImageLoader::start(
        source().failure(fail_img.clone()),
        &fetcher,
        &mailbox,
        MountOptions::default().with_failure_fade(Duration::ZERO),
    );
    fetcher.finish_next(Err(FetchError::Timeout));
    mailbox.pump();

    let ops = loader.visual().draw_ops(Rect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(ops.len(), 1);
    assert!(matches!(
        &ops[0],
        DrawOp::Image { image, mode: ContentMode::Fit, .. } if *image == fail_img
    ));
}

#[test]
fn advance_before_failure_does_not_start_fade() {
    let fetcher = ManualFetcher::default();
    let mailbox = LoadMailbox::new();
    let mut loader = RemoteImageLoader::start(source(), &fetcher, &mailbox, MountOptions::default());

    loader.advance(Duration::from_secs(5));
    fetcher.finish_next(Err(FetchError::Timeout));
    mailbox.pump();

    match loader.visual() {
        LoaderVisual::Failed { progress, .. } => assert_eq!(progress, 0.0),
        other => panic!("expected failed, got {other:?}"),
    }
}

#[test]
fn failed_load_keeps_animating_until_the_fade_completes() {
    let fetcher = ManualFetcher::default();
    let mailbox = LoadMailbox::new();
    let mut loader = RemoteImageLoader::start(source(), &fetcher, &mailbox, MountOptions::default());
    assert!(!loader.is_animating());

    fetcher.finish_next(Err(FetchError::Network("reset".into())));
    mailbox.pump();
    // Nothing ticked yet: the failure glyph is still invisible, so the host must keep advancing.
    assert!(loader.is_animating());
    let ops = loader.visual().draw_ops(Rect::new(0.0, 0.0, 48.0, 48.0));
    assert!(matches!(ops[1], DrawOp::Glyph { glyph: BuiltinGlyph::Failure, opacity, .. } if opacity == 0.0));

    loader.advance(Duration::from_millis(100));
    assert!(loader.is_animating());
    loader.advance(Duration::from_millis(150));
    assert!(!loader.is_animating());
    assert_eq!(
        loader.visual().draw_ops(Rect::new(0.0, 0.0, 48.0, 48.0)).len(),
        1
    );
}

#[test]
fn loaded_and_zero_fade_loads_never_animate() {
    let fetcher = ManualFetcher::default();
    let mailbox = LoadMailbox::new();
    let ok = RemoteImageLoader::start(source(), &fetcher, &mailbox, MountOptions::default());
    let instant = RemoteImageLoader::start(
        source(),
        &fetcher,
        &mailbox,
        MountOptions::default().with_failure_fade(Duration::ZERO),
    );
    fetcher.finish_next(Ok(pixel()));
    fetcher.finish_next(Err(FetchError::Timeout));
    mailbox.pump();

    assert_eq!(ok.phase(), LoadPhase::Loaded);
    assert!(!ok.is_animating());
    assert_eq!(instant.phase(), LoadPhase::Failed);
    assert!(!instant.is_animating());
}
