//! 3D viewer state and its scripted reveal

mod sequencer;
mod session;

pub use sequencer::{ViewerEvent, ViewerSequencer};

#[cfg(test)]
pub use sequencer::Phase;
