//! Application state
//!
//! One `Session` per run. It owns the page anchors and every component, and
//! routes clicks and per-frame updates between them. The navigation bar lives
//! on both screens; the viewer only runs on the onboarding screen.

use crate::anim::Millis;
use crate::annotation::AnnotationSequencer;
use crate::config::RevealConfig;
use crate::overlay::{ClipSurface, ClipTable, OverlayController, OverlayEvent};
use crate::scene::PendingModel;
use crate::tabs::TabBar;
use crate::ui::{ids, HudAction, Page};
use crate::viewer::{ViewerEvent, ViewerSequencer};

/// Which screen is up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Model viewer with the scripted reveal
    Onboarding,
    /// Follow-on screen reached through the hand-off modal
    Cooking,
}

impl Screen {
    /// Resolve a hand-off target. Unknown names stay on onboarding.
    pub fn from_name(name: &str) -> Option<Screen> {
        match name {
            "onboarding" => Some(Screen::Onboarding),
            "cooking" => Some(Screen::Cooking),
            _ => None,
        }
    }
}

pub struct Session<S: ClipSurface> {
    pub screen: Screen,
    pub page: Page,
    pub tabs: TabBar,
    pub overlay: OverlayController<S>,
    pub annotations: AnnotationSequencer,
    pub viewer: ViewerSequencer,
    /// Key of the most recent clip that failed to play
    pub last_failed_clip: Option<String>,
}

impl<S: ClipSurface> Session<S> {
    pub fn new(config: &RevealConfig, surface: S, pending: PendingModel, aspect: f32, now: Millis) -> Self {
        let tabs = TabBar::from_config(&config.tabs);
        let page = Page::standard(tabs.tabs().iter().map(|t| t.panel.as_str()));

        let mut session = Self {
            screen: Screen::Onboarding,
            page,
            tabs,
            overlay: OverlayController::new(surface, ClipTable::from_config(&config.clips)),
            annotations: AnnotationSequencer::standard(&config.annotations),
            viewer: ViewerSequencer::new(config, pending, aspect),
            last_failed_clip: None,
        };

        if let Some(request) = session.tabs.select_initial(&mut session.page, now) {
            session.overlay.play_for_key(&request.key, now);
        }
        session
    }

    /// Navigation bar click
    pub fn select_tab(&mut self, index: usize, now: Millis) {
        if let Some(request) = self.tabs.select(index, &mut self.page, now) {
            self.overlay.play_for_key(&request.key, now);
        }
    }

    /// Start trigger from the button or the keyboard
    pub fn request_start(&mut self, now: Millis) -> bool {
        self.screen == Screen::Onboarding && self.viewer.request_start(now, &mut self.page, &mut self.annotations)
    }

    pub fn handle_hud(&mut self, action: HudAction, now: Millis) {
        match action {
            HudAction::Start => {
                self.request_start(now);
            }
            HudAction::CookStart => {
                if let Some(target) = self.viewer.request_handoff(now, &mut self.page) {
                    self.navigate(&target, now);
                }
            }
            HudAction::ModelToggled(visible) => {
                if !self.viewer.apply_model_toggle(visible) {
                    // Refused: put the checkbox back in line with the model
                    let actual = self.viewer.session.model_visible();
                    if let Some(toggle) = self.page.get_mut(ids::MODEL_TOGGLE) {
                        toggle.checked = actual;
                    }
                }
            }
        }
    }

    pub fn drag(&mut self, dx: f32, dy: f32) -> bool {
        self.screen == Screen::Onboarding && self.viewer.session.drag(dx, dy)
    }

    pub fn resize(&mut self, aspect: f32) {
        self.viewer.reframe(aspect);
    }

    fn navigate(&mut self, target: &str, now: Millis) {
        match Screen::from_name(target) {
            Some(screen) => {
                log::info!("Switching to the {} screen", target);
                self.screen = screen;
                self.overlay.stop();
                // The active tab keeps its background on the new screen
                let key = self.tabs.active().filter(|t| t.media).map(|t| t.id.clone());
                if let Some(key) = key {
                    self.overlay.play_for_key(&key, now);
                }
            }
            None => log::warn!("Unknown hand-off target '{}'", target),
        }
    }

    /// Per-frame update
    pub fn update(&mut self, now: Millis) {
        if self.screen == Screen::Onboarding {
            self.viewer
                .update(now, &mut self.page, &mut self.annotations, &mut self.overlay);
        }
        self.overlay.update(now);

        for event in self.overlay.events.drain() {
            match event {
                OverlayEvent::Failed { key, .. } => self.last_failed_clip = Some(key),
                other => log::debug!("Overlay: {:?}", other),
            }
        }
        for event in self.viewer.events.drain() {
            if let ViewerEvent::Loaded(outcome) = event {
                log::info!("Model ready ({:?})", outcome);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::testing::RecordingSurface;
    use crate::scene::loader::LoadError;
    use crate::scene::model::Model;
    use crate::viewer::Phase;
    use std::path::PathBuf;

    fn config() -> RevealConfig {
        let mut config = RevealConfig::default();
        config.annotations.line1 = "abc".to_string();
        config.annotations.line2 = "de".to_string();
        config
    }

    fn session(result: Result<Model, LoadError>) -> Session<RecordingSurface> {
        let pending = PendingModel::ready(PathBuf::from("assets/models/glasses.obj"), result);
        Session::new(&config(), RecordingSurface::new(500.0), pending, 1.5, 0.0)
    }

    /// Run frames every 16 ms until `until`
    fn run(session: &mut Session<RecordingSurface>, from: Millis, until: Millis) -> Millis {
        let mut now = from;
        while now < until {
            now = (now + 16.0).min(until);
            session.update(now);
        }
        now
    }

    fn visible_panels(session: &Session<RecordingSurface>) -> Vec<String> {
        session
            .tabs
            .tabs()
            .iter()
            .filter(|t| session.page.is_visible(&t.panel))
            .map(|t| t.panel.clone())
            .collect()
    }

    #[test]
    fn test_load_failure_reaches_handoff() {
        let mut session = session(Err(LoadError::Io {
            path: "assets/models/glasses.obj".to_string(),
            message: "not found".to_string(),
        }));
        session.update(0.0);
        assert!(session.viewer.session.model.as_ref().is_some_and(|m| m.placeholder));

        // 400 + 54 + 400 + 36
        let now = run(&mut session, 0.0, 890.0);
        assert_eq!(session.page.text(ids::LINE1_TEXT), Some("abc"));
        assert_eq!(session.page.text(ids::LINE2_TEXT), Some("de"));
        assert!(session.page.get(ids::START_BUTTON).is_some_and(|b| b.interactive()));

        session.handle_hud(HudAction::Start, now);
        assert!(matches!(session.viewer.phase(), Phase::FlipFade { .. }));

        // Flip 1900 ms, reveal 800 ms, pan 10 s
        let now = run(&mut session, now, now + 1900.0 + 800.0 + 10_000.0 + 32.0);
        assert_eq!(session.viewer.phase(), Phase::ModalHandoff);
        assert!(session.page.is_visible(ids::COOKING_MODAL));
        assert!(!session.viewer.session.model_visible());

        session.handle_hud(HudAction::CookStart, now);
        assert_eq!(session.screen, Screen::Cooking);
        assert!(!session.page.is_visible(ids::COOKING_MODAL));
        assert!(session.overlay.is_visible());
    }

    /// Drive a session to the hand-off modal and accept it
    fn cooking_session() -> (Session<RecordingSurface>, Millis) {
        let mut session = session(Err(LoadError::Empty));
        let now = run(&mut session, 0.0, 900.0);
        assert!(session.request_start(now));
        let now = run(&mut session, now, now + 1900.0 + 800.0 + 10_000.0 + 32.0);
        session.handle_hud(HudAction::CookStart, now);
        (session, now)
    }

    #[test]
    fn test_cooking_screen_keeps_active_tab_clip() {
        let (mut session, now) = cooking_session();
        assert_eq!(session.screen, Screen::Cooking);
        assert_eq!(session.tabs.active().map(|t| t.id.as_str()), Some("scan"));
        assert!(session.overlay.is_visible());
        assert!(session.overlay.is_playing());
        assert_eq!(session.overlay.current_key(), Some("scan"));
        assert_eq!(session.overlay.surface().max_attached, 1);

        // Re-selecting the active tab leaves the clip alone
        let scan = session.tabs.index_of("scan").unwrap();
        session.select_tab(scan, now + 5.0);
        session.update(now + 16.0);
        assert!(session.overlay.is_visible());
        assert_eq!(session.overlay.current_key(), Some("scan"));
    }

    #[test]
    fn test_cooking_screen_switches_clips() {
        let (mut session, now) = cooking_session();
        let measure = session.tabs.index_of("measure").unwrap();
        session.select_tab(measure, now + 5.0);
        assert!(session.overlay.is_visible());
        assert_eq!(session.overlay.current_key(), Some("measure"));
        assert_eq!(visible_panels(&session), vec!["measure-content".to_string()]);
    }

    #[test]
    fn test_measure_then_scan_tears_down_first() {
        let mut session = session(Ok(Model::placeholder()));
        let measure = session.tabs.index_of("measure").unwrap();
        let scan = session.tabs.index_of("scan").unwrap();

        session.select_tab(measure, 10.0);
        session.select_tab(scan, 11.0);

        let calls = &session.overlay.surface().calls;
        let destroyed = calls.iter().position(|c| c == "destroy measure").unwrap();
        let attached = calls.iter().rposition(|c| c == "attach scan").unwrap();
        assert!(destroyed < attached);
        assert_eq!(session.overlay.surface().max_attached, 1);
        assert_eq!(session.overlay.current_key(), Some("scan"));
        assert_eq!(visible_panels(&session), vec!["scan-content".to_string()]);
    }

    #[test]
    fn test_initial_tab_plays_its_clip() {
        let session = session(Ok(Model::placeholder()));
        assert_eq!(session.tabs.active().map(|t| t.id.as_str()), Some("scan"));
        assert_eq!(session.overlay.current_key(), Some("scan"));
        assert_eq!(visible_panels(&session), vec!["scan-content".to_string()]);
    }

    #[test]
    fn test_clip_failure_is_recorded_and_hidden() {
        let mut surface = RecordingSurface::new(500.0);
        surface.broken.push("recipe".to_string());
        let pending = PendingModel::ready(PathBuf::from("m.obj"), Err(LoadError::Empty));
        let mut session = Session::new(&config(), surface, pending, 1.5, 0.0);

        let recipe = session.tabs.index_of("recipe").unwrap();
        session.select_tab(recipe, 5.0);
        session.update(16.0);

        assert_eq!(session.last_failed_clip.as_deref(), Some("recipe"));
        assert!(!session.overlay.is_visible());
        // The tab switch itself went through
        assert_eq!(visible_panels(&session), vec!["recipe-content".to_string()]);
        // The viewer is unaffected
        assert_eq!(session.viewer.phase(), Phase::Annotating);
    }

    #[test]
    fn test_repeated_clip_failures_keep_only_the_last() {
        let mut surface = RecordingSurface::new(500.0);
        surface.broken.push("recipe".to_string());
        surface.broken.push("measure".to_string());
        let pending = PendingModel::ready(PathBuf::from("m.obj"), Err(LoadError::Empty));
        let mut session = Session::new(&config(), surface, pending, 1.5, 0.0);

        let recipe = session.tabs.index_of("recipe").unwrap();
        let measure = session.tabs.index_of("measure").unwrap();
        let mut now = 0.0;
        for _ in 0..50 {
            now += 10.0;
            session.select_tab(recipe, now);
            session.update(now);
            now += 10.0;
            session.select_tab(measure, now);
            session.update(now);
        }
        assert_eq!(session.last_failed_clip.as_deref(), Some("measure"));
    }

    #[test]
    fn test_model_toggle_refused_during_flip() {
        let mut session = session(Err(LoadError::Empty));
        let now = run(&mut session, 0.0, 900.0);
        assert!(session.request_start(now));

        if let Some(toggle) = session.page.get_mut(ids::MODEL_TOGGLE) {
            toggle.checked = false;
        }
        session.handle_hud(HudAction::ModelToggled(false), now + 10.0);
        assert!(session.viewer.session.model_visible());
        assert!(session.page.get(ids::MODEL_TOGGLE).is_some_and(|t| t.checked));
    }

    #[test]
    fn test_start_only_once() {
        let mut session = session(Err(LoadError::Empty));
        let now = run(&mut session, 0.0, 900.0);
        assert!(session.request_start(now));
        assert!(!session.request_start(now + 5.0));
    }

    #[test]
    fn test_screen_names() {
        assert_eq!(Screen::from_name("cooking"), Some(Screen::Cooking));
        assert_eq!(Screen::from_name("elsewhere"), None);
    }
}
