use std::time::Duration;

use crate::compose::avatar::{MountedAvatar, RING, compose_layer, initials_ops};
use crate::foundation::core::{Rect, Rgba8Premul, Vec2};
use crate::identity::styler::IdentityStyler;
use crate::loader::fetch::ImageFetcher;
use crate::loader::mailbox::LoadMailbox;
use crate::loader::remote::MountOptions;
use crate::model::size::AvatarSize;
use crate::model::source::AvatarSource;
use crate::scene::model::{AvatarLayer, LayerRole, Scene};

/// Visible sources when no limit is given.
pub const DEFAULT_LIMIT: i32 = 3;

/// Horizontal step between stacked avatars, as a fraction of the diameter (negative direction).
pub const OVERLAP: f64 = 0.3;

/// Text of the overflow marker.
pub const OVERFLOW_TEXT: &str = "\u{2026}";

/// Fill behind the overflow marker (opaque system gray).
pub const OVERFLOW_BACKGROUND: Rgba8Premul = Rgba8Premul {
    r: 142,
    g: 142,
    b: 147,
    a: 255,
};

/// One visible source in a group layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupSlot {
    /// Position of the source in the caller's sequence.
    pub source_index: usize,
    /// Horizontal offset of the avatar's left edge.
    pub offset_x: f64,
    /// Stacking order; the last input source is highest.
    pub z: i32,
}

/// Placement of every visible avatar and the optional overflow marker.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupLayout {
    /// Visible sources, top of the stack first.
    pub slots: Vec<GroupSlot>,
    /// Offset of the overflow marker when one is shown. Its z is always 0.
    pub overflow_offset: Option<f64>,
    /// Avatar diameter shared by every slot.
    pub diameter: f64,
}

/// Lay out `count` sources.
///
/// The last `limit` sources are shown in reverse input order, each stepped left by
/// `OVERLAP * diameter`. A non-positive `limit` shows nothing; the overflow marker still sits at
/// `limit * -OVERLAP * diameter`, so a negative limit puts it to the right of the origin.
pub fn layout_group(count: usize, size: AvatarSize, limit: i32, show_overflow: bool) -> GroupLayout {
    let diameter = size.diameter();
    let step = -OVERLAP * diameter;
    let visible = usize::try_from(limit).unwrap_or(0).min(count);

    let slots = (0..visible)
        .map(|i| GroupSlot {
            source_index: count - 1 - i,
            offset_x: i as f64 * step,
            z: limit - i as i32,
        })
        .collect();

    // An empty group stays empty even when a negative limit would otherwise admit a marker.
    let overflow_offset = (show_overflow && count > 0 && count as i64 > i64::from(limit))
        .then(|| f64::from(limit) * step);

    GroupLayout {
        slots,
        overflow_offset,
        diameter,
    }
}

/// A horizontally stacked row of avatars with a bounded visible count.
#[derive(Clone, Debug, PartialEq)]
pub struct AvatarGroup {
    sources: Vec<AvatarSource>,
    size: AvatarSize,
    limit: i32,
    show_overflow: bool,
}

impl AvatarGroup {
    /// Group of `sources` at `size`, showing at most [`DEFAULT_LIMIT`] without an overflow marker.
    pub fn new(sources: Vec<AvatarSource>, size: AvatarSize) -> Self {
        Self {
            sources,
            size,
            limit: DEFAULT_LIMIT,
            show_overflow: false,
        }
    }

    /// Set how many sources are shown. Zero or negative shows none.
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = limit;
        self
    }

    /// Show a marker when some sources are hidden.
    pub fn show_overflow(mut self, show: bool) -> Self {
        self.show_overflow = show;
        self
    }

    /// Sources in caller order.
    pub fn sources(&self) -> &[AvatarSource] {
        &self.sources
    }

    /// Diameter preset shared by every member.
    pub fn size(&self) -> AvatarSize {
        self.size
    }

    /// Placement of visible members.
    pub fn layout(&self) -> GroupLayout {
        layout_group(self.sources.len(), self.size, self.limit, self.show_overflow)
    }

    /// Mount every visible member. Hidden sources never fetch.
    #[tracing::instrument(skip(self, fetcher, mailbox), fields(sources = self.sources.len()))]
    pub fn mount(
        &self,
        fetcher: &dyn ImageFetcher,
        mailbox: &LoadMailbox,
        options: MountOptions,
    ) -> MountedGroup {
        let layout = self.layout();
        let members = layout
            .slots
            .iter()
            .map(|slot| {
                MountedAvatar::mount(
                    self.sources[slot.source_index].clone(),
                    self.size,
                    fetcher,
                    mailbox,
                    options,
                )
            })
            .collect();
        MountedGroup {
            size: self.size,
            layout,
            members,
        }
    }

    /// Scene without mounting. Remote members render their pending state.
    #[tracing::instrument(skip(self), fields(sources = self.sources.len()))]
    pub fn scene(&self) -> Scene {
        let layout = self.layout();
        let styler = IdentityStyler::new();
        let layers = layout
            .slots
            .iter()
            .map(|slot| {
                compose_layer(
                    &self.sources[slot.source_index],
                    self.size,
                    None,
                    &styler,
                    LayerRole::Source {
                        index: slot.source_index,
                    },
                )
            })
            .collect();
        assemble(&layout, self.size, layers)
    }
}

/// Live group: one mounted avatar per visible slot.
pub struct MountedGroup {
    size: AvatarSize,
    layout: GroupLayout,
    members: Vec<MountedAvatar>,
}

impl MountedGroup {
    /// Placement used at mount time.
    pub fn layout(&self) -> &GroupLayout {
        &self.layout
    }

    /// Mounted members, in slot order (top of the stack first).
    pub fn members(&self) -> &[MountedAvatar] {
        &self.members
    }

    /// Changes whenever any member's load state changes.
    pub fn revision(&self) -> u64 {
        self.members.iter().map(MountedAvatar::revision).sum()
    }

    /// Whether any member is mid-transition and needs [`MountedGroup::advance`].
    pub fn is_animating(&self) -> bool {
        self.members.iter().any(MountedAvatar::is_animating)
    }

    /// Advance time-driven transitions of every member.
    pub fn advance(&mut self, dt: Duration) {
        for m in &mut self.members {
            m.advance(dt);
        }
    }

    /// Current scene.
    pub fn scene(&self) -> Scene {
        let styler = IdentityStyler::new();
        let layers = self
            .layout
            .slots
            .iter()
            .zip(&self.members)
            .map(|(slot, m)| {
                m.layer_with(
                    &styler,
                    LayerRole::Source {
                        index: slot.source_index,
                    },
                )
            })
            .collect();
        assemble(&self.layout, self.size, layers)
    }
}

fn assemble(layout: &GroupLayout, size: AvatarSize, layers: Vec<AvatarLayer>) -> Scene {
    let mut scene = Scene::empty(layout.diameter);
    for (slot, mut layer) in layout.slots.iter().zip(layers) {
        layer.offset = Vec2::new(slot.offset_x, 0.0);
        layer.z = slot.z;
        scene.layers.push(layer);
    }
    if let Some(offset_x) = layout.overflow_offset {
        scene.layers.push(overflow_layer(size, offset_x));
    }
    scene
}

fn overflow_layer(size: AvatarSize, offset_x: f64) -> AvatarLayer {
    let d = size.diameter();
    AvatarLayer {
        role: LayerRole::Overflow,
        offset: Vec2::new(offset_x, 0.0),
        z: 0,
        diameter: d,
        ops: initials_ops(
            OVERFLOW_TEXT.to_owned(),
            Rect::new(0.0, 0.0, d, d),
            size.font_size(),
            OVERFLOW_BACKGROUND,
            Rgba8Premul::white(),
        ),
        ring: RING,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/group.rs"]
mod tests;
