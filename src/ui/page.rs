//! Page anchors
//!
//! Every on-screen control or text block the sequencers touch is an
//! `Element` registered under a stable id. Components look elements up by id
//! and treat a missing one as "nothing to do" instead of failing.

use std::collections::HashMap;

use crate::anim::Millis;

/// Stable element ids
pub mod ids {
    pub const LOADING: &str = "loading";
    pub const ANNO_LAYER: &str = "anno-layer";
    pub const LINE1_IMG: &str = "line1-img";
    pub const LINE2_IMG: &str = "line2-img";
    pub const LINE1_TEXT: &str = "line1-text";
    pub const LINE2_TEXT: &str = "line2-text";
    pub const START_BUTTON: &str = "start-button";
    pub const GLASS_TOGGLE: &str = "glass-toggle";
    pub const MODEL_TOGGLE: &str = "model-toggle";
    pub const COOKING_MODAL: &str = "cooking-modal";
    pub const COOK_START: &str = "cook-start";
}

/// Presentation state of one anchor
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub visible: bool,
    pub text: String,
    /// Accepts clicks
    pub enabled: bool,
    /// Typing caret shown after the text
    pub caret: bool,
    /// Drawn faded (used for a pressed start button)
    pub dimmed: bool,
    /// Checkbox state for toggles
    pub checked: bool,
    /// When `visible` last changed, for fade transitions
    pub changed_at: Millis,
}

impl Element {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            text: String::new(),
            enabled: true,
            caret: false,
            dimmed: false,
            checked: false,
            changed_at: 0.0,
        }
    }

    pub fn shown() -> Self {
        Self {
            visible: true,
            ..Self::hidden()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Show or hide, restarting the transition clock on change
    pub fn set_visible(&mut self, visible: bool, now: Millis) {
        if self.visible != visible {
            self.visible = visible;
            self.changed_at = now;
        }
    }

    /// Hide then show again in one step, replaying the reveal transition
    pub fn replay_reveal(&mut self, now: Millis) {
        self.visible = true;
        self.changed_at = now;
    }

    /// Clickable right now
    pub fn interactive(&self) -> bool {
        self.visible && self.enabled
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::hidden()
    }
}

/// Registry of anchors by id
#[derive(Debug, Clone, Default)]
pub struct Page {
    elements: HashMap<String, Element>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full onboarding page: viewer controls, annotation layer, hand-off
    /// modal, and one content panel per navigation tab
    pub fn standard<'a>(panels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut page = Self::new();
        page.register(ids::LOADING, Element::shown().with_text("Loading model..."));
        page.register(ids::ANNO_LAYER, Element::hidden());
        page.register(ids::LINE1_IMG, Element::hidden());
        page.register(ids::LINE2_IMG, Element::hidden());
        page.register(ids::LINE1_TEXT, Element::shown());
        page.register(ids::LINE2_TEXT, Element::shown());
        page.register(ids::START_BUTTON, Element::hidden().with_text("Start"));
        page.register(ids::GLASS_TOGGLE, Element::hidden().with_text("Glass").with_checked(true));
        page.register(ids::MODEL_TOGGLE, Element::shown().with_text("Model").with_checked(true));
        page.register(ids::COOKING_MODAL, Element::hidden().with_text("Ready to cook?"));
        page.register(ids::COOK_START, Element::shown().with_text("Start cooking"));
        for panel in panels {
            page.register(panel, Element::hidden());
        }
        page
    }

    pub fn register(&mut self, id: &str, element: Element) {
        self.elements.insert(id.to_string(), element);
    }

    #[cfg(test)]
    pub fn remove(&mut self, id: &str) -> Option<Element> {
        self.elements.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Missing elements count as hidden
    pub fn is_visible(&self, id: &str) -> bool {
        self.get(id).is_some_and(|e| e.visible)
    }

    /// Returns false if the element does not exist
    pub fn set_visible(&mut self, id: &str, visible: bool, now: Millis) -> bool {
        match self.get_mut(id) {
            Some(element) => {
                element.set_visible(visible, now);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn text(&self, id: &str) -> Option<&str> {
        self.get(id).map(|e| e.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_page() {
        let page = Page::standard(["scan-content", "measure-content"]);
        assert!(page.is_visible(ids::LOADING));
        assert!(!page.is_visible(ids::START_BUTTON));
        assert!(page.get(ids::MODEL_TOGGLE).is_some_and(|e| e.checked));
        assert!(page.contains("measure-content"));
        assert!(!page.is_visible("scan-content"));
    }

    #[test]
    fn test_missing_anchor_is_noop() {
        let mut page = Page::new();
        assert!(!page.set_visible("nowhere", true, 0.0));
        assert!(!page.is_visible("nowhere"));
        assert_eq!(page.text("nowhere"), None);
    }

    #[test]
    fn test_visibility_change_timestamp() {
        let mut element = Element::hidden();
        element.set_visible(true, 100.0);
        element.set_visible(true, 250.0);
        assert_eq!(element.changed_at, 100.0);
        element.replay_reveal(300.0);
        assert_eq!(element.changed_at, 300.0);
        assert!(element.interactive());
    }
}
