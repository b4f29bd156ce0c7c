//! Viewer choreography
//!
//! The viewer walks a fixed list of phases:
//!
//! ```text
//! Loading -> Ready -> Annotating -> AwaitingStart -> FlipFade -> Hidden
//!         -> RevealFadeIn -> Panning -> ModalHandoff
//! ```
//!
//! `update` is called once per frame with the frame's timestamp. A phase that
//! completes hands over to the next one at its exact end time, so a late
//! frame runs several phases back to back without stretching any of them.
//! The only phase that always lasts a frame is `Hidden`: the model stays
//! invisible for at least one rendered frame after the flip.

use std::f32::consts::PI;

use super::session::ViewerSession;
use crate::anim::{linear_progress, Easing, Millis, Tween};
use crate::annotation::{AnnotationSequencer, AnnotationStatus, StartOutcome};
use crate::config::{FlipConfig, FramingConfig, ModelConfig, PanConfig, RevealConfig};
use crate::event::EventQueue;
use crate::overlay::{ClipSurface, OverlayController};
use crate::scene::{frame_model, prepare_model, LoadOutcome, PendingModel};
use crate::ui::{ids, Page};

/// Number of pan legs: out to one side, across, back to center
const PAN_LEGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Loading,
    Ready(LoadOutcome),
    Annotating,
    AwaitingStart,
    FlipFade { started: Millis, from_yaw: f32 },
    /// Flip ended at `since`; the model is invisible for this frame
    Hidden { since: Millis },
    RevealFadeIn { started: Millis },
    Panning { leg: usize, started: Millis, base_yaw: f32 },
    ModalHandoff,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Ready(_) => "ready",
            Phase::Annotating => "annotating",
            Phase::AwaitingStart => "awaiting start",
            Phase::FlipFade { .. } => "flip",
            Phase::Hidden { .. } => "hidden",
            Phase::RevealFadeIn { .. } => "reveal",
            Phase::Panning { .. } => "panning",
            Phase::ModalHandoff => "hand-off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanOutcome {
    Completed,
    /// A leg overran its deadline; the pan was cut short
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    Loaded(LoadOutcome),
    AwaitingStart,
    FlipStarted,
    FlipFinished,
    Revealed,
    PanStarted,
    PanFinished(PanOutcome),
    HandoffShown,
    /// The hand-off control was used; carries the follow-on screen
    Navigate(String),
}

enum Step {
    Stay,
    /// Switch and keep going in the same frame
    Next(Phase),
    /// Switch, then wait for the next frame
    NextFrame(Phase),
}

pub struct ViewerSequencer {
    pub session: ViewerSession,
    phase: Phase,
    pending: Option<PendingModel>,
    model_config: ModelConfig,
    framing: FramingConfig,
    flip: FlipConfig,
    pan: PanConfig,
    follow_on: String,
    navigated: bool,
    last_now: Millis,
    pub events: EventQueue<ViewerEvent>,
}

impl ViewerSequencer {
    pub fn new(config: &RevealConfig, pending: PendingModel, aspect: f32) -> Self {
        Self {
            session: ViewerSession::new(aspect, config.model.allow_user_rotate, config.model.drag_speed),
            phase: Phase::Loading,
            pending: Some(pending),
            model_config: config.model.clone(),
            framing: config.framing,
            flip: config.flip,
            pan: config.pan.clone(),
            follow_on: config.follow_on.clone(),
            navigated: false,
            last_now: 0.0,
            events: EventQueue::new(),
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Clamp to a monotonic clock
    fn clock(&mut self, now: Millis) -> Millis {
        let now = now.max(self.last_now);
        self.last_now = now;
        now
    }

    fn set_phase(&mut self, phase: Phase) {
        if std::mem::discriminant(&phase) != std::mem::discriminant(&self.phase) {
            log::info!("Viewer: {} -> {}", self.phase.name(), phase.name());
        }
        self.phase = phase;
    }

    /// Advance the choreography to `now`
    pub fn update<S: ClipSurface>(
        &mut self,
        now: Millis,
        page: &mut Page,
        annotations: &mut AnnotationSequencer,
        overlay: &mut OverlayController<S>,
    ) {
        let now = self.clock(now);
        loop {
            match self.step(now, page, annotations, overlay) {
                Step::Stay => break,
                Step::Next(phase) => self.set_phase(phase),
                Step::NextFrame(phase) => {
                    self.set_phase(phase);
                    break;
                }
            }
        }
    }

    fn step<S: ClipSurface>(
        &mut self,
        now: Millis,
        page: &mut Page,
        annotations: &mut AnnotationSequencer,
        overlay: &mut OverlayController<S>,
    ) -> Step {
        match self.phase {
            Phase::Loading => self.poll_load(now, page),
            Phase::Ready(_) => {
                self.session.allow_user_rotate = false;
                match annotations.start(now, page) {
                    StartOutcome::Started | StartOutcome::AlreadyRunning => Step::Next(Phase::Annotating),
                    StartOutcome::MissingAnchors => self.enter_awaiting(now, page),
                }
            }
            Phase::Annotating => match annotations.update(now, page) {
                AnnotationStatus::Running => Step::Stay,
                _ => self.enter_awaiting(now, page),
            },
            Phase::AwaitingStart | Phase::ModalHandoff => Step::Stay,
            Phase::FlipFade { started, from_yaw } => self.step_flip(now, started, from_yaw, page),
            Phase::Hidden { since } => {
                // Final state: annotations gone, model back at zero opacity
                page.set_visible(ids::ANNO_LAYER, false, now);
                self.session.set_model_visible(true);
                if let Some(toggle) = page.get_mut(ids::MODEL_TOGGLE) {
                    toggle.checked = true;
                }
                self.session.begin_fade();
                self.session.set_fade(0.0);
                Step::Next(Phase::RevealFadeIn { started: since })
            }
            Phase::RevealFadeIn { started } => {
                let t = linear_progress(now, started, self.flip.reveal_ms);
                self.session.set_fade(t);
                if t < 1.0 {
                    return Step::Stay;
                }
                self.session.restore_baselines();
                page.set_visible(ids::GLASS_TOGGLE, true, now);
                self.events.send(ViewerEvent::Revealed);
                match self.enter_pan(started + self.flip.reveal_ms.max(0.0), overlay) {
                    Some(phase) => Step::Next(phase),
                    None => Step::Stay,
                }
            }
            Phase::Panning { leg, started, base_yaw } => self.step_pan(now, leg, started, base_yaw, page, overlay),
        }
    }

    fn poll_load(&mut self, now: Millis, page: &mut Page) -> Step {
        let Some(pending) = self.pending.as_mut() else {
            return Step::Stay;
        };
        let Some(result) = pending.poll() else {
            return Step::Stay;
        };
        let path = pending.path.clone();
        self.pending = None;

        let (model, outcome) = prepare_model(result, &path, &self.model_config, &self.framing);
        self.session.model = Some(model);
        self.reframe(self.session.camera.aspect);
        page.set_visible(ids::LOADING, false, now);
        self.events.send(ViewerEvent::Loaded(outcome));
        Step::Next(Phase::Ready(outcome))
    }

    fn enter_awaiting(&mut self, now: Millis, page: &mut Page) -> Step {
        self.session.allow_user_rotate = self.model_config.allow_user_rotate;
        match page.get_mut(ids::START_BUTTON) {
            Some(button) => {
                // Annotations may have stopped before revealing the button
                button.set_visible(true, now);
                button.enabled = true;
                button.dimmed = false;
            }
            None => log::warn!("No start button on the page; press Enter or Space to start"),
        }
        self.events.send(ViewerEvent::AwaitingStart);
        Step::Next(Phase::AwaitingStart)
    }

    /// The start control was activated. Ignored unless the viewer is waiting
    /// for it with a model loaded.
    pub fn request_start(&mut self, now: Millis, page: &mut Page, annotations: &mut AnnotationSequencer) -> bool {
        if self.phase != Phase::AwaitingStart || self.session.is_animating || self.session.model.is_none() {
            return false;
        }
        let now = self.clock(now);

        annotations.cancel(now, page);
        if let Some(button) = page.get_mut(ids::START_BUTTON) {
            button.enabled = false;
            button.dimmed = true;
        }

        self.session.begin_fade();
        self.session.is_animating = true;
        let from_yaw = self.session.rotation_y();
        self.set_phase(Phase::FlipFade { started: now, from_yaw });
        self.events.send(ViewerEvent::FlipStarted);
        true
    }

    fn step_flip(&mut self, now: Millis, started: Millis, from_yaw: f32, page: &mut Page) -> Step {
        let rotation = linear_progress(now, started, self.flip.rotation_ms);
        let fade_start = started + self.flip.fade_delay_ms;
        let fade = linear_progress(now, fade_start, self.flip.fade_ms);

        self.session.set_rotation_y(from_yaw + PI * Easing::InOutQuad.apply(rotation));
        self.session.set_fade(1.0 - fade);

        if rotation < 1.0 || fade < 1.0 {
            return Step::Stay;
        }

        self.session.set_model_visible(false);
        self.session.is_animating = false;
        page.set_visible(ids::START_BUTTON, false, now);
        self.events.send(ViewerEvent::FlipFinished);

        let end = (started + self.flip.rotation_ms.max(0.0)).max(fade_start + self.flip.fade_ms.max(0.0));
        Step::NextFrame(Phase::Hidden { since: end })
    }

    /// Start the pan and its background clip. A pan already in progress wins.
    fn enter_pan<S: ClipSurface>(&mut self, at: Millis, overlay: &mut OverlayController<S>) -> Option<Phase> {
        if self.session.is_panning {
            return None;
        }
        self.session.is_panning = true;
        overlay.play_for_key(&self.pan.clip, at);
        self.events.send(ViewerEvent::PanStarted);
        Some(Phase::Panning {
            leg: 0,
            started: at,
            base_yaw: self.session.rotation_y(),
        })
    }

    fn pan_leg(&self, leg: usize, started: Millis, base: f32) -> Option<Tween> {
        let swing = self.pan.angle_deg.to_radians();
        let (from, to, duration) = match leg {
            0 => (base, base - swing, self.pan.outer_leg_ms),
            1 => (base - swing, base + swing, self.pan.outer_leg_ms),
            2 => (base + swing, base, self.pan.return_leg_ms),
            _ => return None,
        };
        Some(Tween::new(from, to, started, duration, Easing::InOutQuad))
    }

    fn step_pan<S: ClipSurface>(
        &mut self,
        now: Millis,
        leg: usize,
        started: Millis,
        base_yaw: f32,
        page: &mut Page,
        overlay: &mut OverlayController<S>,
    ) -> Step {
        let Some(tween) = self.pan_leg(leg, started, base_yaw) else {
            return self.finish_pan(now, PanOutcome::Completed, page, overlay);
        };

        if now > tween.end() + self.pan.leg_timeout_ms.max(0.0) {
            log::warn!(
                "Pan leg {} overran its deadline by {:.0} ms, finishing early",
                leg + 1,
                now - tween.end()
            );
            self.session.set_rotation_y(base_yaw);
            return self.finish_pan(now, PanOutcome::TimedOut, page, overlay);
        }

        self.session.set_rotation_y(tween.value(now));
        if !tween.is_done(now) {
            return Step::Stay;
        }
        if leg + 1 < PAN_LEGS {
            Step::Next(Phase::Panning {
                leg: leg + 1,
                started: tween.end(),
                base_yaw,
            })
        } else {
            self.finish_pan(now, PanOutcome::Completed, page, overlay)
        }
    }

    /// Runs however the pan ended
    fn finish_pan<S: ClipSurface>(
        &mut self,
        now: Millis,
        outcome: PanOutcome,
        page: &mut Page,
        overlay: &mut OverlayController<S>,
    ) -> Step {
        self.session.is_panning = false;
        overlay.hold();
        self.session.set_model_visible(false);
        if !page.set_visible(ids::COOKING_MODAL, true, now) {
            log::warn!("No hand-off modal on the page");
        }
        self.events.send(ViewerEvent::PanFinished(outcome));
        self.events.send(ViewerEvent::HandoffShown);
        Step::Next(Phase::ModalHandoff)
    }

    /// The hand-off control was activated. Returns the follow-on screen once.
    pub fn request_handoff(&mut self, now: Millis, page: &mut Page) -> Option<String> {
        if self.phase != Phase::ModalHandoff || self.navigated {
            return None;
        }
        let now = self.clock(now);
        self.navigated = true;
        page.set_visible(ids::COOKING_MODAL, false, now);
        log::info!("Handing off to '{}'", self.follow_on);
        self.events.send(ViewerEvent::Navigate(self.follow_on.clone()));
        Some(self.follow_on.clone())
    }

    /// Model visibility checkbox. Only honoured while no scripted phase owns
    /// the model's visibility.
    pub fn apply_model_toggle(&mut self, visible: bool) -> bool {
        let idle = matches!(self.phase, Phase::Ready(_) | Phase::Annotating | Phase::AwaitingStart);
        if !idle || self.session.is_animating || self.session.is_panning || self.session.model.is_none() {
            return false;
        }
        self.session.set_model_visible(visible);
        true
    }

    /// Refit the camera for a new viewport aspect
    pub fn reframe(&mut self, aspect: f32) {
        let session = &mut self.session;
        match &session.model {
            Some(model) => frame_model(&mut session.camera, model, aspect, self.framing.padding),
            None => session.camera.aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 },
        }
    }
}
