use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::assets::image::ImageHandle;
use crate::loader::fetch::FetchOutcome;

/// Coarse load phase, without payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadPhase {
    /// Fetch issued, no outcome yet.
    Loading,
    /// Fetch succeeded.
    Loaded,
    /// Fetch failed; never changes again.
    Failed,
}

/// Load state with the fetched image when available.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    /// Fetch issued, no outcome yet.
    Loading,
    /// Fetch succeeded.
    Loaded(ImageHandle),
    /// Fetch failed. The cause is intentionally not retained.
    Failed,
}

impl LoadState {
    /// Phase of this state.
    pub fn phase(&self) -> LoadPhase {
        match self {
            Self::Loading => LoadPhase::Loading,
            Self::Loaded(_) => LoadPhase::Loaded,
            Self::Failed => LoadPhase::Failed,
        }
    }
}

type Listener = Box<dyn FnMut(&LoadState)>;

struct LoadSlot {
    state: LoadState,
    revision: u64,
    listeners: Vec<Listener>,
}

/// Observable holder for one avatar instance's load state.
///
/// Single-threaded (`!Send`): it lives on the thread that owns the visual tree. `resolve` is the
/// only mutation point; hosts observe changes by polling [`LoadCell::revision`] or through
/// [`LoadCell::subscribe`]. Clones share the same state.
#[derive(Clone)]
pub struct LoadCell {
    slot: Rc<RefCell<LoadSlot>>,
}

impl Default for LoadCell {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadCell {
    /// New cell in [`LoadState::Loading`].
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(LoadSlot {
                state: LoadState::Loading,
                revision: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoadState {
        self.slot.borrow().state.clone()
    }

    /// Current phase.
    pub fn phase(&self) -> LoadPhase {
        self.slot.borrow().state.phase()
    }

    /// Increments on every state change; starts at 0.
    pub fn revision(&self) -> u64 {
        self.slot.borrow().revision
    }

    /// Call `listener` after every state change of this cell.
    pub fn subscribe(&self, listener: impl FnMut(&LoadState) + 'static) {
        self.slot.borrow_mut().listeners.push(Box::new(listener));
    }

    /// Apply a fetch outcome. Only `Loading` accepts outcomes; returns whether the state changed.
    pub(crate) fn resolve(&self, outcome: FetchOutcome) -> bool {
        let (snapshot, mut listeners) = {
            let mut slot = self.slot.borrow_mut();
            if slot.state.phase() != LoadPhase::Loading {
                tracing::debug!(
                    phase = ?slot.state.phase(),
                    ok = outcome.is_ok(),
                    "ignoring outcome for settled avatar load"
                );
                return false;
            }
            slot.state = match outcome {
                Ok(image) => LoadState::Loaded(image),
                Err(e) => {
                    tracing::debug!(error = %e, "avatar image load failed");
                    LoadState::Failed
                }
            };
            slot.revision += 1;
            (slot.state.clone(), std::mem::take(&mut slot.listeners))
        };

        // Listeners run without the borrow held so they may read (or subscribe to) this cell.
        for listener in &mut listeners {
            listener(&snapshot);
        }

        let mut slot = self.slot.borrow_mut();
        let added = std::mem::replace(&mut slot.listeners, listeners);
        slot.listeners.extend(added);
        true
    }

    pub(crate) fn downgrade(&self) -> WeakLoadCell {
        WeakLoadCell(Rc::downgrade(&self.slot))
    }
}

impl std::fmt::Debug for LoadCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("LoadCell")
            .field("state", &slot.state)
            .field("revision", &slot.revision)
            .field("listeners", &slot.listeners.len())
            .finish()
    }
}

/// Non-owning reference used by the mailbox; dead once the owning avatar is dropped.
#[derive(Clone)]
pub(crate) struct WeakLoadCell(Weak<RefCell<LoadSlot>>);

impl WeakLoadCell {
    pub(crate) fn upgrade(&self) -> Option<LoadCell> {
        self.0.upgrade().map(|slot| LoadCell { slot })
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/state.rs"]
mod tests;
