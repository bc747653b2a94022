use super::*;
use crate::assets::image::ImageHandle;
use crate::foundation::core::Rgba8Premul;
use crate::loader::fetch::FetchError;
use crate::loader::state::LoadPhase;

fn pixel() -> ImageHandle {
    ImageHandle::solid(1, 1, Rgba8Premul::white()).unwrap()
}

#[test]
fn completion_applies_only_on_pump() {
    let mailbox = LoadMailbox::new();
    let cell = LoadCell::new();
    let completion = mailbox.register(&cell);
    assert_eq!(mailbox.pending(), 1);

    completion.complete(Ok(pixel()));
    assert_eq!(cell.phase(), LoadPhase::Loading);

    assert_eq!(mailbox.pump(), 1);
    assert_eq!(cell.phase(), LoadPhase::Loaded);
    assert_eq!(mailbox.pending(), 0);
}

#[test]
fn completion_from_worker_thread_is_delivered() {
    let mailbox = LoadMailbox::new();
    let cell = LoadCell::new();
    let completion = mailbox.register(&cell);

    std::thread::spawn(move || completion.complete(Err(FetchError::Timeout)))
        .join()
        .unwrap();

    assert_eq!(mailbox.pump_timeout(Duration::from_secs(5)), 1);
    assert_eq!(cell.phase(), LoadPhase::Failed);
}

#[test]
fn dropped_cell_turns_completion_into_noop() {
    let mailbox = LoadMailbox::new();
    let cell = LoadCell::new();
    let completion = mailbox.register(&cell);
    drop(cell);

    assert_eq!(mailbox.pending(), 0);
    completion.complete(Ok(pixel()));
    assert_eq!(mailbox.pump(), 0);
}

#[test]
fn tickets_are_unique_and_routed() {
    let mailbox = LoadMailbox::new();
    let a = LoadCell::new();
    let b = LoadCell::new();
    let ca = mailbox.register(&a);
    let cb = mailbox.register(&b);
    assert_ne!(ca.ticket(), cb.ticket());

    cb.complete(Err(FetchError::Io("nope".into())));
    mailbox.pump();
    assert_eq!(a.phase(), LoadPhase::Loading);
    assert_eq!(b.phase(), LoadPhase::Failed);

    ca.complete(Ok(pixel()));
    mailbox.pump();
    assert_eq!(a.phase(), LoadPhase::Loaded);
}

#[test]
fn settle_returns_at_deadline_when_nothing_arrives() {
    let mailbox = LoadMailbox::new();
    let cell = LoadCell::new();
    let _completion = mailbox.register(&cell);

    let changed = mailbox.settle(Instant::now() + Duration::from_millis(20));
    assert_eq!(changed, 0);
    assert_eq!(mailbox.pending(), 1);
}
