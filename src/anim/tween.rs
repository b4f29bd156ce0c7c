//! Single-value tween

use super::{linear_progress, Easing, Millis};

/// Interpolates one scalar from `from` to `to` over a wall-clock span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    /// Timestamp the span starts at (may lie in the future for delayed tweens)
    pub start: Millis,
    pub duration: Millis,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, start: Millis, duration: Millis, easing: Easing) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self, now: Millis) -> f32 {
        linear_progress(now, self.start, self.duration)
    }

    /// Interpolated value at `now`
    pub fn value(&self, now: Millis) -> f32 {
        let eased = self.easing.apply(self.progress(now));
        self.from + (self.to - self.from) * eased
    }

    pub fn is_done(&self, now: Millis) -> bool {
        self.progress(now) >= 1.0
    }

    /// Timestamp at which progress reaches 1
    pub fn end(&self) -> Millis {
        self.start + self.duration.max(0.0)
    }
}
