//! Bottom navigation bar
//!
//! Draws one equal-width slot per tab. The active tab's label and indicator
//! use the accent color, the rest are white.

use macroquad::prelude::*;

use super::{theme, Rect, UiContext};
use crate::tabs::Tab;

/// Layout constants
pub mod layout {
    /// Bar height
    pub const BAR_HEIGHT: f32 = 64.0;
    /// Active tab indicator height
    pub const INDICATOR_HEIGHT: f32 = 3.0;
    /// Indicator width relative to the slot
    pub const INDICATOR_WIDTH: f32 = 0.4;
    /// Font size for tab labels
    pub const FONT_SIZE: f32 = 18.0;
    /// Icon dot radius
    pub const ICON_RADIUS: f32 = 7.0;
}

/// Slot rects for `count` tabs laid out across `rect`
pub fn tab_slots(rect: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let w = rect.w / count as f32;
    (0..count)
        .map(|i| Rect::new((rect.x + w * i as f32).round(), rect.y, w.round(), rect.h))
        .collect()
}

/// Draw the bar. Returns the index of the clicked tab, or None if no click
pub fn draw_nav_bar(ctx: &mut UiContext, rect: Rect, tabs: &[Tab]) -> Option<usize> {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, theme::NAV_BG);
    // Top border
    draw_rectangle(rect.x, rect.y, rect.w, 1.0, Color::new(1.0, 1.0, 1.0, 0.08));

    let mut clicked = None;
    for (i, (tab, slot)) in tabs.iter().zip(tab_slots(rect, tabs.len())).enumerate() {
        let color = if tab.active { theme::ACCENT } else { theme::TEXT_COLOR };

        // Icon stand-in: filled when active, ring otherwise
        let icon_x = slot.center_x();
        let icon_y = slot.y + slot.h * 0.35;
        if tab.active {
            draw_circle(icon_x, icon_y, layout::ICON_RADIUS, color);
        } else {
            draw_circle_lines(icon_x, icon_y, layout::ICON_RADIUS, 1.5, color);
        }

        let dims = measure_text(&tab.label, None, layout::FONT_SIZE as u16, 1.0);
        draw_text(
            &tab.label,
            (slot.center_x() - dims.width * 0.5).round(),
            (slot.y + slot.h * 0.78).round(),
            layout::FONT_SIZE,
            color,
        );

        if tab.active {
            let w = slot.w * layout::INDICATOR_WIDTH;
            draw_rectangle(slot.center_x() - w * 0.5, slot.y, w, layout::INDICATOR_HEIGHT, color);
        }

        if ctx.take_click(&slot) {
            clicked = Some(i);
        }
    }

    clicked
}
