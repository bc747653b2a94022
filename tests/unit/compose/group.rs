use std::cell::RefCell;

use url::Url;

use super::*;
use crate::loader::fetch::FetchError;
use crate::loader::mailbox::Completion;
use crate::scene::model::DrawOp;

fn names(n: &[&str]) -> Vec<AvatarSource> {
    n.iter().map(|s| AvatarSource::name(*s)).collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn last_sources_are_shown_in_reverse_with_overlap() {
    let layout = layout_group(4, AvatarSize::Medium, 3, false);
    let d = 48.0;
    assert_eq!(layout.diameter, d);
    let idx: Vec<usize> = layout.slots.iter().map(|s| s.source_index).collect();
    let z: Vec<i32> = layout.slots.iter().map(|s| s.z).collect();
    assert_eq!(idx, vec![3, 2, 1]);
    assert_eq!(z, vec![3, 2, 1]);
    assert!(close(layout.slots[0].offset_x, 0.0));
    assert!(close(layout.slots[1].offset_x, -0.3 * d));
    assert!(close(layout.slots[2].offset_x, -0.6 * d));
    assert_eq!(layout.overflow_offset, None);
}

#[test]
fn overflow_marker_follows_the_last_visible_slot() {
    let layout = layout_group(4, AvatarSize::Medium, 3, true);
    let off = layout.overflow_offset.expect("marker");
    assert!(close(off, -0.9 * 48.0));
}

#[test]
fn no_marker_when_everything_fits() {
    assert_eq!(layout_group(3, AvatarSize::Small, 3, true).overflow_offset, None);
    assert_eq!(layout_group(1, AvatarSize::Small, 3, true).overflow_offset, None);
    assert_eq!(layout_group(3, AvatarSize::Small, 3, true).slots.len(), 3);
}

#[test]
fn zero_limit_shows_only_the_marker() {
    let layout = layout_group(2, AvatarSize::Medium, 0, true);
    assert!(layout.slots.is_empty());
    assert_eq!(layout.overflow_offset, Some(0.0));
}

#[test]
fn negative_limit_places_marker_to_the_right() {
    let layout = layout_group(2, AvatarSize::Large, -2, true);
    assert!(layout.slots.is_empty());
    let off = layout.overflow_offset.expect("marker");
    assert!(close(off, 0.6 * 80.0));

    let hidden = layout_group(2, AvatarSize::Large, -2, false);
    assert!(hidden.slots.is_empty());
    assert_eq!(hidden.overflow_offset, None);
}

#[test]
fn empty_group_is_empty() {
    for limit in [-1, 0, 3] {
        let scene = AvatarGroup::new(Vec::new(), AvatarSize::Medium)
            .limit(limit)
            .show_overflow(true)
            .scene();
        assert!(scene.is_empty(), "limit {limit}");
        assert_eq!(scene.height, 48.0);
    }
}

#[test]
fn defaults_are_three_without_marker() {
    let g = AvatarGroup::new(names(&["A", "B", "C", "D", "E"]), AvatarSize::Small);
    let layout = g.layout();
    assert_eq!(layout.slots.len(), DEFAULT_LIMIT as usize);
    assert_eq!(layout.overflow_offset, None);
}

#[test]
fn scene_layers_carry_roles_offsets_and_z() {
    let scene = AvatarGroup::new(names(&["Ann", "Bob", "Cy", "Di"]), AvatarSize::Medium)
        .limit(3)
        .show_overflow(true)
        .scene();
    assert_eq!(scene.layers.len(), 4);
    assert_eq!(scene.layers[0].role, LayerRole::Source { index: 3 });
    assert_eq!(scene.layers[3].role, LayerRole::Overflow);
    assert_eq!(scene.layers[3].z, 0);
    assert!(close(scene.layers[3].offset.x, -0.9 * 48.0));
    assert!(close(scene.layers[1].offset.x, -0.3 * 48.0));

    let order: Vec<LayerRole> = scene.draw_order().iter().map(|l| l.role).collect();
    assert_eq!(
        order,
        vec![
            LayerRole::Overflow,
            LayerRole::Source { index: 1 },
            LayerRole::Source { index: 2 },
            LayerRole::Source { index: 3 },
        ]
    );
}

#[test]
fn overflow_marker_uses_fixed_colors() {
    let scene = AvatarGroup::new(names(&["Ann", "Bob"]), AvatarSize::Large)
        .limit(1)
        .show_overflow(true)
        .scene();
    let marker = scene.layers.last().expect("marker layer");
    assert_eq!(marker.role, LayerRole::Overflow);
    assert_eq!(
        marker.ops,
        vec![
            DrawOp::FillRect {
                rect: Rect::new(0.0, 0.0, 80.0, 80.0),
                color: OVERFLOW_BACKGROUND,
            },
            DrawOp::Text {
                text: OVERFLOW_TEXT.to_owned(),
                frame: Rect::new(0.0, 0.0, 80.0, 80.0),
                font_size: 32.0,
                color: Rgba8Premul::white(),
            },
        ]
    );
}

#[derive(Default)]
struct CountingFetcher {
    urls: RefCell<Vec<Url>>,
    issued: RefCell<Vec<Completion>>,
}

impl ImageFetcher for CountingFetcher {
    fn fetch(&self, url: &Url, completion: Completion) {
        self.urls.borrow_mut().push(url.clone());
        self.issued.borrow_mut().push(completion);
    }
}

#[test]
fn mount_fetches_only_visible_remote_members() {
    let remote = |n: u32| {
        AvatarSource::remote(Url::parse(&format!("https://example.com/{n}.png")).unwrap())
    };
    let group = AvatarGroup::new(
        vec![remote(0), remote(1), AvatarSource::name("Cy"), remote(3)],
        AvatarSize::Medium,
    )
    .limit(2);
    let fetcher = CountingFetcher::default();
    let mailbox = LoadMailbox::new();

    let mut mounted = group.mount(&fetcher, &mailbox, MountOptions::default());
    assert_eq!(
        fetcher.urls.borrow().as_slice(),
        &[Url::parse("https://example.com/3.png").unwrap()]
    );
    assert_eq!(mounted.members().len(), 2);
    assert_eq!(mounted.revision(), 0);

    assert!(!mounted.is_animating());
    for c in fetcher.issued.borrow_mut().drain(..) {
        c.complete(Err(FetchError::Network("refused".into())));
    }
    assert_eq!(mailbox.pump(), 1);
    assert_eq!(mounted.revision(), 1);
    assert!(mounted.is_animating());

    mounted.advance(Duration::from_secs(1));
    assert!(!mounted.is_animating());
    let scene = mounted.scene();
    assert_eq!(scene.layers.len(), 2);
    assert_eq!(scene.layers[0].role, LayerRole::Source { index: 3 });
    assert_eq!(scene.layers[0].z, 2);
}
