use std::time::Duration;

use crate::animation::ease::Ease;

/// Host-driven crossfade progress.
///
/// The host advances the fade with wall-clock deltas; nothing here reads a clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
    duration: Duration,
    elapsed: Duration,
    ease: Ease,
}

impl Fade {
    /// Start a fade of `duration` eased with `ease`.
    pub fn new(duration: Duration, ease: Ease) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            ease,
        }
    }

    /// Advance by `dt`, saturating at the fade duration.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    /// Eased progress in `[0, 1]`. Zero-length fades are always complete.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.ease.apply(t)
    }

    /// `true` once the fade reached its end.
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/fade.rs"]
mod tests;
