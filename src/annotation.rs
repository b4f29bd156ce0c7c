//! Annotation sequence
//!
//! Once the model is ready, a fixed script runs over the page anchors:
//! reveal the first callout image, type its caption, reveal the second
//! image, type its caption, then expose the start button. Steps run strictly
//! one after another; each starts at the exact time the previous one ended,
//! so the whole script keeps wall-clock timing even at low frame rates.

use crate::anim::Millis;
use crate::config::AnnotationConfig;
use crate::ui::{ids, Page};

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationStep {
    /// Replay an element's reveal transition and wait for it to settle
    RevealImage { anchor: String, settle: Millis },
    /// Type `text` into an element one character per `interval`
    TypeText { anchor: String, text: String, interval: Millis },
    /// Show a control and make it clickable
    RevealControl { anchor: String },
}

impl AnnotationStep {
    pub fn anchor(&self) -> &str {
        match self {
            AnnotationStep::RevealImage { anchor, .. }
            | AnnotationStep::TypeText { anchor, .. }
            | AnnotationStep::RevealControl { anchor } => anchor,
        }
    }

    /// How long the step takes once entered
    pub fn duration(&self) -> Millis {
        match self {
            AnnotationStep::RevealImage { settle, .. } => *settle,
            AnnotationStep::TypeText { text, interval, .. } => text.chars().count() as Millis * interval,
            AnnotationStep::RevealControl { .. } => 0.0,
        }
    }
}

/// Characters of a typed caption visible `elapsed` ms after typing began
pub fn typed_len(elapsed: Millis, interval: Millis, len: usize) -> usize {
    if interval <= 0.0 {
        return len;
    }
    if elapsed <= 0.0 {
        return 0;
    }
    ((elapsed / interval).floor() as usize).min(len)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationStatus {
    Idle,
    Running,
    Finished,
    /// An anchor was missing; the script stopped where it was
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// The script is already running; the request was dropped
    AlreadyRunning,
    MissingAnchors,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RunState {
    Idle,
    Running { step: usize, started: Millis },
    Finished,
}

pub struct AnnotationSequencer {
    steps: Vec<AnnotationStep>,
    state: RunState,
}

impl AnnotationSequencer {
    pub fn new(steps: Vec<AnnotationStep>) -> Self {
        Self {
            steps,
            state: RunState::Idle,
        }
    }

    /// The onboarding script: two callouts with captions, then the start button
    pub fn standard(config: &AnnotationConfig) -> Self {
        let image = |anchor: &str| AnnotationStep::RevealImage {
            anchor: anchor.to_string(),
            settle: config.settle_ms,
        };
        let typed = |anchor: &str, text: &str| AnnotationStep::TypeText {
            anchor: anchor.to_string(),
            text: text.to_string(),
            interval: config.char_interval_ms,
        };
        Self::new(vec![
            image(ids::LINE1_IMG),
            typed(ids::LINE1_TEXT, &config.line1),
            image(ids::LINE2_IMG),
            typed(ids::LINE2_TEXT, &config.line2),
            AnnotationStep::RevealControl {
                anchor: ids::START_BUTTON.to_string(),
            },
        ])
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    pub fn status(&self) -> AnnotationStatus {
        match self.state {
            RunState::Idle => AnnotationStatus::Idle,
            RunState::Running { .. } => AnnotationStatus::Running,
            RunState::Finished => AnnotationStatus::Finished,
        }
    }

    /// Index of the step in progress
    #[cfg(test)]
    pub fn current_step(&self) -> Option<usize> {
        match self.state {
            RunState::Running { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Begin the script. Never runs twice at once; starting again after it
    /// finished replays it from the top.
    pub fn start(&mut self, now: Millis, page: &mut Page) -> StartOutcome {
        if self.is_running() {
            return StartOutcome::AlreadyRunning;
        }

        let missing: Vec<&str> = std::iter::once(ids::ANNO_LAYER)
            .chain(self.steps.iter().map(|s| s.anchor()))
            .filter(|id| !page.contains(id))
            .collect();
        if !missing.is_empty() {
            log::warn!("Annotations skipped, missing anchors: {}", missing.join(", "));
            self.state = RunState::Idle;
            return StartOutcome::MissingAnchors;
        }

        page.set_visible(ids::ANNO_LAYER, true, now);
        if self.steps.is_empty() {
            self.state = RunState::Finished;
            return StartOutcome::Started;
        }
        if !self.enter(0, now, page) {
            return StartOutcome::MissingAnchors;
        }
        self.state = RunState::Running { step: 0, started: now };
        StartOutcome::Started
    }

    /// Advance to `now`, finishing as many steps as the elapsed time covers
    pub fn update(&mut self, now: Millis, page: &mut Page) -> AnnotationStatus {
        loop {
            let RunState::Running { step, started } = self.state else {
                return self.status();
            };

            let done_at = started + self.steps[step].duration();
            if !self.apply(step, started, now.min(done_at), page) {
                return self.abort(step);
            }
            if now < done_at {
                return AnnotationStatus::Running;
            }

            self.finish(step, done_at, page);
            let next = step + 1;
            if next >= self.steps.len() {
                self.state = RunState::Finished;
                log::info!("Annotations finished");
                return AnnotationStatus::Finished;
            }
            if !self.enter(next, done_at, page) {
                return self.abort(next);
            }
            self.state = RunState::Running { step: next, started: done_at };
        }
    }

    /// Stop the script and clear everything it put on the page
    pub fn cancel(&mut self, now: Millis, page: &mut Page) {
        self.state = RunState::Idle;
        page.set_visible(ids::ANNO_LAYER, false, now);
        for step in &self.steps {
            match step {
                AnnotationStep::RevealImage { anchor, .. } => {
                    page.set_visible(anchor, false, now);
                }
                AnnotationStep::TypeText { anchor, .. } => {
                    if let Some(element) = page.get_mut(anchor) {
                        element.text.clear();
                        element.caret = false;
                    }
                }
                AnnotationStep::RevealControl { .. } => {}
            }
        }
    }

    fn abort(&mut self, step: usize) -> AnnotationStatus {
        log::warn!("Annotation anchor '{}' disappeared, stopping", self.steps[step].anchor());
        self.state = RunState::Idle;
        AnnotationStatus::Aborted
    }

    fn enter(&self, step: usize, at: Millis, page: &mut Page) -> bool {
        let Some(element) = page.get_mut(self.steps[step].anchor()) else {
            return false;
        };
        match &self.steps[step] {
            AnnotationStep::RevealImage { .. } => element.replay_reveal(at),
            AnnotationStep::TypeText { .. } => {
                element.text.clear();
                element.caret = true;
            }
            AnnotationStep::RevealControl { .. } => {
                element.set_visible(true, at);
                element.enabled = true;
                element.dimmed = false;
            }
        }
        true
    }

    fn apply(&self, step: usize, started: Millis, at: Millis, page: &mut Page) -> bool {
        let Some(element) = page.get_mut(self.steps[step].anchor()) else {
            return false;
        };
        if let AnnotationStep::TypeText { text, interval, .. } = &self.steps[step] {
            let n = typed_len(at - started, *interval, text.chars().count());
            if element.text.chars().count() != n {
                element.text = text.chars().take(n).collect();
            }
        }
        true
    }

    fn finish(&self, step: usize, at: Millis, page: &mut Page) {
        match &self.steps[step] {
            AnnotationStep::TypeText { anchor, text, .. } => {
                if let Some(element) = page.get_mut(anchor) {
                    element.text.clone_from(text);
                    element.caret = false;
                }
            }
            AnnotationStep::RevealControl { .. } => {
                // The glass toggle stays out of the way while start is offered
                page.set_visible(ids::GLASS_TOGGLE, false, at);
            }
            AnnotationStep::RevealImage { .. } => {}
        }
    }
}
