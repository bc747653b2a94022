use std::io::Cursor;
use std::time::Duration;

use super::*;
use crate::loader::mailbox::LoadMailbox;
use crate::loader::state::{LoadCell, LoadPhase, LoadState};

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn scratch_file(name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("avatar-kit-fetch-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn file_fetcher_decodes_local_png() {
    let path = scratch_file("ok.png", &png_bytes(3, 2));
    let url = Url::from_file_path(&path).unwrap();

    let mailbox = LoadMailbox::new();
    let cell = LoadCell::new();
    FileFetcher.fetch(&url, mailbox.register(&cell));
    assert_eq!(cell.phase(), LoadPhase::Loading);

    mailbox.pump();
    match cell.state() {
        LoadState::Loaded(img) => assert_eq!((img.width(), img.height()), (3, 2)),
        other => panic!("expected loaded, got {other:?}"),
    }
}

#[test]
fn file_fetcher_reports_failures() {
    assert!(matches!(
        FileFetcher::read(&Url::parse("https://example.com/a.png").unwrap()),
        Err(FetchError::UnsupportedScheme(s)) if s == "https"
    ));

    let missing = std::env::temp_dir().join("avatar-kit-definitely-missing.png");
    let url = Url::from_file_path(&missing).unwrap();
    assert!(matches!(FileFetcher::read(&url), Err(FetchError::Io(_))));

    let garbage = scratch_file("garbage.png", b"not an image");
    let url = Url::from_file_path(&garbage).unwrap();
    assert!(matches!(FileFetcher::read(&url), Err(FetchError::Decode(_))));
}

#[test]
fn pooled_fetcher_runs_transport_off_thread() {
    let bytes = png_bytes(4, 4);
    let fetcher = PooledFetcher::new(move |url: &Url| {
        if url.path().ends_with("ok.png") {
            Ok(bytes.clone())
        } else {
            Err(FetchError::Network("404".into()))
        }
    });

    let mailbox = LoadMailbox::new();
    let ok = LoadCell::new();
    let bad = LoadCell::new();
    fetcher.fetch(
        &Url::parse("mem://host/ok.png").unwrap(),
        mailbox.register(&ok),
    );
    fetcher.fetch(
        &Url::parse("mem://host/missing.png").unwrap(),
        mailbox.register(&bad),
    );

    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    assert_eq!(mailbox.settle(deadline), 2);
    assert_eq!(ok.phase(), LoadPhase::Loaded);
    assert_eq!(bad.phase(), LoadPhase::Failed);
}

#[test]
fn fetch_errors_display_their_cause() {
    assert_eq!(FetchError::Timeout.to_string(), "timed out");
    assert!(
        FetchError::Decode("bad header".into())
            .to_string()
            .contains("bad header")
    );
}
