//! Full-screen overlay clips
//!
//! At most one clip is live. Starting a clip tears the previous one down
//! (detach, then destroy) before the new one is constructed and attached.
//! Clips play once, muted, and freeze on their last frame when they end.
//! Load or playback failures hide the overlay and are reported as events.

mod frames;

pub use frames::FrameSequenceSurface;

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::anim::Millis;
use crate::config::ClipConfig;
use crate::event::EventQueue;
use crate::ui::Rect;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    #[error("clip directory {0} not found")]
    MissingClip(String),
    #[error("clip {0} has no frames")]
    NoFrames(String),
    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("clip decoder stopped unexpectedly")]
    WorkerLost,
    #[error("clips are not available on this platform")]
    Unsupported,
}

/// A resolved clip: lookup key plus where its frames live
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRef {
    pub key: String,
    pub path: PathBuf,
    pub fps: f32,
}

/// Static key → clip lookup with a default for unmapped keys
#[derive(Debug, Clone, PartialEq)]
pub struct ClipTable {
    root: PathBuf,
    default_clip: String,
    by_key: BTreeMap<String, String>,
    fps: f32,
}

impl ClipTable {
    pub fn from_config(config: &ClipConfig) -> Self {
        Self {
            root: config.root.clone(),
            default_clip: config.default_clip.clone(),
            by_key: config.by_key.clone(),
            fps: config.fps,
        }
    }

    pub fn resolve(&self, key: &str) -> ClipRef {
        let dir = self.by_key.get(key).unwrap_or(&self.default_clip);
        ClipRef {
            key: key.to_string(),
            path: self.root.join(dir),
            fps: self.fps,
        }
    }
}

/// What a surface reports when polled
#[derive(Debug, Clone, PartialEq)]
pub enum ClipStatus {
    /// Frames not ready yet
    Loading,
    Playing,
    /// Reached the last frame and holds it
    Ended,
    Failed(OverlayError),
}

/// The playback primitive the controller sequences
pub trait ClipSurface {
    type Clip;

    /// Build a clip; fails if its resource cannot be found
    fn construct(&mut self, clip: &ClipRef) -> Result<Self::Clip, OverlayError>;
    /// Put the clip on screen
    fn attach(&mut self, clip: &mut Self::Clip);
    fn play(&mut self, clip: &mut Self::Clip, now: Millis);
    fn poll(&mut self, clip: &mut Self::Clip, now: Millis) -> ClipStatus;
    /// Stop advancing and take the clip off the playback path
    fn detach(&mut self, clip: &mut Self::Clip);
    fn destroy(&mut self, clip: Self::Clip);
    fn draw(&self, clip: &Self::Clip, screen: Rect);
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    Started(String),
    /// Natural end; the last frame stays up
    Ended(String),
    Failed { key: String, error: OverlayError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Playback {
    Playing,
    /// Ran to the end, still attached and showing the last frame
    Ended,
    /// Detached; whatever frame was current stays
    Detached,
}

struct LiveClip<C> {
    key: String,
    clip: C,
    playback: Playback,
}

/// Owns the single live overlay
pub struct OverlayController<S: ClipSurface> {
    surface: S,
    table: ClipTable,
    live: Option<LiveClip<S::Clip>>,
    visible: bool,
    pub events: EventQueue<OverlayEvent>,
}

impl<S: ClipSurface> OverlayController<S> {
    pub fn new(surface: S, table: ClipTable) -> Self {
        Self {
            surface,
            table,
            live: None,
            visible: false,
            events: EventQueue::new(),
        }
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[cfg(test)]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Key of the clip currently held (playing, frozen or stopped)
    #[cfg(test)]
    pub fn current_key(&self) -> Option<&str> {
        self.live.as_ref().map(|l| l.key.as_str())
    }

    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.live.as_ref().is_some_and(|l| l.playback == Playback::Playing)
    }

    fn teardown(&mut self) {
        if let Some(mut live) = self.live.take() {
            if live.playback != Playback::Detached {
                self.surface.detach(&mut live.clip);
            }
            self.surface.destroy(live.clip);
        }
        self.visible = false;
    }

    fn fail(&mut self, key: String, error: OverlayError) {
        log::error!("Overlay clip '{}' failed: {}", key, error);
        self.teardown();
        self.events.send(OverlayEvent::Failed { key, error });
    }

    /// Replace whatever is showing with `clip`
    pub fn play_clip(&mut self, clip: &ClipRef, now: Millis) {
        self.teardown();

        match self.surface.construct(clip) {
            Ok(mut built) => {
                self.surface.attach(&mut built);
                self.surface.play(&mut built, now);
                self.live = Some(LiveClip {
                    key: clip.key.clone(),
                    clip: built,
                    playback: Playback::Playing,
                });
                self.visible = true;
                log::info!("Overlay clip '{}' started", clip.key);
                self.events.send(OverlayEvent::Started(clip.key.clone()));
            }
            Err(error) => self.fail(clip.key.clone(), error),
        }
    }

    /// Play the clip mapped to a tab (or the default clip)
    pub fn play_for_key(&mut self, key: &str, now: Millis) {
        let clip = self.table.resolve(key);
        self.play_clip(&clip, now);
    }

    /// Detach and hide; the last frame is kept until the next `play_clip`
    pub fn stop(&mut self) {
        self.detach_live();
        self.visible = false;
    }

    /// Detach but leave the frozen frame on screen
    pub fn hold(&mut self) {
        self.detach_live();
    }

    fn detach_live(&mut self) {
        if let Some(live) = self.live.as_mut() {
            if live.playback != Playback::Detached {
                self.surface.detach(&mut live.clip);
                live.playback = Playback::Detached;
            }
        }
    }

    /// Advance the live clip
    pub fn update(&mut self, now: Millis) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        if live.playback != Playback::Playing {
            return;
        }

        match self.surface.poll(&mut live.clip, now) {
            ClipStatus::Loading | ClipStatus::Playing => {}
            ClipStatus::Ended => {
                live.playback = Playback::Ended;
                log::info!("Overlay clip '{}' ended, holding last frame", live.key);
                self.events.send(OverlayEvent::Ended(live.key.clone()));
            }
            ClipStatus::Failed(error) => {
                let key = live.key.clone();
                self.fail(key, error);
            }
        }
    }

    pub fn draw(&self, screen: Rect) {
        if !self.visible {
            return;
        }
        if let Some(live) = &self.live {
            self.surface.draw(&live.clip, screen);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSurface;
    use super::*;

    fn controller() -> OverlayController<RecordingSurface> {
        OverlayController::new(RecordingSurface::new(1000.0), ClipTable::from_config(&ClipConfig::default()))
    }

    #[test]
    fn test_clip_table_default() {
        let table = ClipTable::from_config(&ClipConfig::default());
        assert_eq!(table.resolve("measure").path, PathBuf::from("assets/clips/measure"));
        // Unmapped keys fall back to the default clip
        let timer = table.resolve("timer");
        assert_eq!(timer.key, "timer");
        assert_eq!(timer.path, PathBuf::from("assets/clips/scan"));
    }

    #[test]
    fn test_new_clip_tears_down_previous_first() {
        let mut overlay = controller();
        overlay.play_for_key("measure", 0.0);
        overlay.play_for_key("scan", 10.0);

        assert_eq!(
            overlay.surface().calls,
            vec![
                "construct measure",
                "attach measure",
                "play measure",
                "detach measure",
                "destroy measure",
                "construct scan",
                "attach scan",
                "play scan",
            ]
        );
        assert_eq!(overlay.surface().max_attached, 1);
        assert_eq!(overlay.current_key(), Some("scan"));
    }

    #[test]
    fn test_end_freezes_without_hiding() {
        let mut overlay = controller();
        overlay.play_for_key("scan", 0.0);
        overlay.update(500.0);
        assert!(overlay.is_playing());
        overlay.update(1000.0);
        assert!(!overlay.is_playing());
        assert!(overlay.is_visible());
        let events: Vec<_> = overlay.events.drain().collect();
        assert_eq!(events.last(), Some(&OverlayEvent::Ended("scan".to_string())));
        // Further updates do not report the end again
        overlay.update(2000.0);
        assert!(overlay.events.is_empty());
    }

    #[test]
    fn test_stop_hides_but_keeps_clip() {
        let mut overlay = controller();
        overlay.play_for_key("scan", 0.0);
        overlay.stop();
        assert!(!overlay.is_visible());
        assert_eq!(overlay.current_key(), Some("scan"));
        assert_eq!(overlay.surface().attached, 0);
        // Stopping twice does not detach twice
        overlay.stop();
        assert_eq!(overlay.surface().calls.iter().filter(|c| c.starts_with("detach")).count(), 1);
    }

    #[test]
    fn test_hold_keeps_frame_visible() {
        let mut overlay = controller();
        overlay.play_for_key("scan", 0.0);
        overlay.hold();
        assert!(overlay.is_visible());
        assert!(!overlay.is_playing());
    }

    #[test]
    fn test_failure_hides_and_reports() {
        let mut overlay = controller();
        overlay.play_for_key("scan", 0.0);
        overlay.surface.broken.push("recipe".to_string());
        overlay.play_for_key("recipe", 5.0);

        assert!(!overlay.is_visible());
        assert_eq!(overlay.current_key(), None);
        assert!(overlay.events.iter().any(|e| matches!(e, OverlayEvent::Failed { key, .. } if key == "recipe")));
    }
}
