//! Navigation tab selection
//!
//! Exactly one tab is active at a time and exactly one content panel is
//! visible. Selecting a tab that declares media asks the overlay for that
//! tab's background clip.

use crate::anim::Millis;
use crate::config::TabConfig;
use crate::ui::Page;

/// One navigation entry
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: String,
    pub label: String,
    /// Content panel anchor
    pub panel: String,
    /// Swaps the background clip when selected
    pub media: bool,
    pub default_entry: bool,
    pub active: bool,
}

impl Tab {
    pub fn from_config(config: &TabConfig) -> Self {
        Self {
            id: config.id.clone(),
            label: config.label.clone(),
            panel: config.panel.clone(),
            media: config.media,
            default_entry: config.default_entry,
            active: false,
        }
    }
}

/// Background media wanted after a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    /// Clip lookup key (the tab id)
    pub key: String,
}

/// The navigation bar's state
#[derive(Debug, Clone, Default)]
pub struct TabBar {
    tabs: Vec<Tab>,
}

impl TabBar {
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self { tabs }
    }

    pub fn from_config(configs: &[TabConfig]) -> Self {
        Self::new(configs.iter().map(Tab::from_config).collect())
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    #[cfg(test)]
    pub fn active_index(&self) -> Option<usize> {
        self.tabs.iter().position(|t| t.active)
    }

    pub fn active(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.active)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    /// Startup selection: the default entry tab, else the first one
    pub fn select_initial(&mut self, page: &mut Page, now: Millis) -> Option<MediaRequest> {
        let index = self.tabs.iter().position(|t| t.default_entry).unwrap_or(0);
        self.select(index, page, now)
    }

    /// Activate one tab and deactivate the rest. Re-selecting the active tab
    /// changes nothing; an out-of-range index or an empty bar is a no-op.
    pub fn select(&mut self, index: usize, page: &mut Page, now: Millis) -> Option<MediaRequest> {
        if index >= self.tabs.len() || self.tabs[index].active {
            return None;
        }

        // Deactivate everything first, then show the one panel
        for tab in &mut self.tabs {
            tab.active = false;
            page.set_visible(&tab.panel, false, now);
        }

        let tab = &mut self.tabs[index];
        tab.active = true;
        if !page.set_visible(&tab.panel, true, now) {
            log::warn!("Tab '{}' has no content panel '{}'", tab.id, tab.panel);
        }
        log::debug!("Selected tab '{}'", tab.id);

        tab.media.then(|| MediaRequest { key: tab.id.clone() })
    }

    #[cfg(test)]
    pub fn select_id(&mut self, id: &str, page: &mut Page, now: Millis) -> Option<MediaRequest> {
        let index = self.index_of(id)?;
        self.select(index, page, now)
    }
}
