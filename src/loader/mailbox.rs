use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};

use crate::loader::fetch::FetchOutcome;
use crate::loader::state::{LoadCell, WeakLoadCell};

/// Identifies one issued fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

struct Delivery {
    ticket: Ticket,
    outcome: FetchOutcome,
}

/// One-shot completion handle given to an [`crate::ImageFetcher`].
///
/// `Send`, so fetchers may complete from worker threads. Consumed by [`Completion::complete`],
/// which makes a second completion for the same fetch unrepresentable.
pub struct Completion {
    ticket: Ticket,
    tx: Sender<Delivery>,
}

impl Completion {
    /// Ticket of the fetch this handle completes.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Post the outcome back to the owning thread.
    pub fn complete(self, outcome: FetchOutcome) {
        let ticket = self.ticket;
        if self.tx.send(Delivery { ticket, outcome }).is_err() {
            tracing::debug!(?ticket, "mailbox gone; dropping fetch completion");
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("ticket", &self.ticket)
            .finish()
    }
}

/// Delivers fetch completions to load cells on the thread that owns them.
///
/// Fetchers post from anywhere; the host calls [`LoadMailbox::pump`] from its render loop.
/// Completions for avatars dropped in the meantime are discarded.
pub struct LoadMailbox {
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
    waiting: RefCell<HashMap<Ticket, WeakLoadCell>>,
    next_ticket: Cell<u64>,
}

impl Default for LoadMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadMailbox {
    /// Empty mailbox.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            waiting: RefCell::new(HashMap::new()),
            next_ticket: Cell::new(0),
        }
    }

    /// Register `cell` as the receiver of one fetch and return its completion handle.
    pub(crate) fn register(&self, cell: &LoadCell) -> Completion {
        let ticket = Ticket(self.next_ticket.get());
        self.next_ticket.set(ticket.0 + 1);
        self.waiting.borrow_mut().insert(ticket, cell.downgrade());
        Completion {
            ticket,
            tx: self.tx.clone(),
        }
    }

    /// Apply every queued completion. Returns how many load cells changed state.
    pub fn pump(&self) -> usize {
        let mut changed = 0;
        loop {
            match self.rx.try_recv() {
                Ok(d) => changed += usize::from(self.deliver(d)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    /// Block up to `timeout` for the first completion, then pump the rest.
    ///
    /// Returns how many load cells changed state; 0 on timeout.
    pub fn pump_timeout(&self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(d) => usize::from(self.deliver(d)) + self.pump(),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Keep pumping until nothing is pending or `deadline` passes. Returns cells changed.
    pub fn settle(&self, deadline: Instant) -> usize {
        let mut changed = self.pump();
        while self.pending() > 0 {
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(pending = self.pending(), "avatar loads still pending at deadline");
                break;
            }
            changed += self.pump_timeout(deadline - now);
        }
        changed
    }

    /// Fetches issued for live avatars that have not completed yet.
    pub fn pending(&self) -> usize {
        let mut waiting = self.waiting.borrow_mut();
        waiting.retain(|_, cell| cell.is_alive());
        waiting.len()
    }

    fn deliver(&self, d: Delivery) -> bool {
        let Some(weak) = self.waiting.borrow_mut().remove(&d.ticket) else {
            tracing::debug!(ticket = ?d.ticket, "completion for unknown or dropped avatar");
            return false;
        };
        match weak.upgrade() {
            Some(cell) => cell.resolve(d.outcome),
            None => {
                tracing::debug!(ticket = ?d.ticket, "avatar dropped before its image loaded");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/mailbox.rs"]
mod tests;
