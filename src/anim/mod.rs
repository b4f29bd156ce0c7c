//! Timed interpolation
//!
//! Every transition in the experience (flip, fades, pan legs) is a `Tween`
//! measured from its own start timestamp. Progress is a pure function of the
//! wall clock, so a slow or uneven frame rate never stretches a transition.

mod easing;
mod tween;

pub use easing::{linear_progress, Easing};
pub use tween::Tween;

/// Milliseconds on the session's monotonic clock
pub type Millis = f64;
