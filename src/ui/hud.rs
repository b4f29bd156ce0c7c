//! Heads-up layer: everything drawn on top of the viewer
//!
//! Reads presentation state from the page anchors each frame and reports
//! clicks back as a `HudAction`. Nothing here changes sequencing state
//! except the model toggle's checkbox.

use macroquad::prelude::*;

use super::page::{ids, Element, Page};
use super::{tabbar, theme, Rect, UiContext};
use crate::anim::{linear_progress, Millis};

/// Clicks the session has to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudAction {
    Start,
    CookStart,
    ModelToggled(bool),
}

/// Greedy word wrap. `measure` returns the drawn width of a string.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if measure(&candidate) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Opacity of an element given its visibility and when it last changed
pub fn element_alpha(element: &Element, now: Millis) -> f32 {
    let t = linear_progress(now, element.changed_at, theme::TRANSITION_MS);
    if element.visible {
        t
    } else {
        1.0 - t
    }
}

fn with_alpha(color: Color, alpha: f32) -> Color {
    Color::new(color.r, color.g, color.b, color.a * alpha)
}

fn draw_button(rect: Rect, label: &str, alpha: f32) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, with_alpha(theme::BUTTON_BG, alpha));
    let dims = measure_text(label, None, theme::FONT_SIZE_CONTENT as u16, 1.0);
    draw_text(
        label,
        (rect.center_x() - dims.width * 0.5).round(),
        (rect.center_y() + dims.height * 0.5).round(),
        theme::FONT_SIZE_CONTENT,
        with_alpha(theme::BUTTON_TEXT, alpha),
    );
}

fn draw_wrapped(text: &str, rect: Rect, caret: bool, now: Millis, alpha: f32) {
    let size = theme::FONT_SIZE_CONTENT;
    let mut lines = wrap_text(text, rect.w, |s| measure_text(s, None, size as u16, 1.0).width);
    // Blinking caret while typing
    if caret && (now / 500.0) as u64 % 2 == 0 {
        match lines.last_mut() {
            Some(last) => last.push('|'),
            None => lines.push("|".to_string()),
        }
    }
    for (i, line) in lines.iter().enumerate() {
        draw_text(
            line,
            rect.x.round(),
            (rect.y + size * (i as f32 + 1.0) * 1.2).round(),
            size,
            with_alpha(theme::TEXT_COLOR, alpha),
        );
    }
}

/// Callout line: a segment with a dot at its anchor end, drawn growing in
fn draw_callout(from: Vec2, to: Vec2, alpha: f32) {
    let end = from + (to - from) * alpha;
    let color = with_alpha(theme::CALLOUT_LINE, alpha);
    draw_circle(from.x, from.y, 4.0, color);
    draw_line(from.x, from.y, end.x, end.y, 2.0, color);
}

fn draw_annotations(page: &Page, view: Rect, now: Millis) {
    let Some(layer) = page.get(ids::ANNO_LAYER) else {
        return;
    };
    let layer_alpha = element_alpha(layer, now);
    if layer_alpha <= 0.0 {
        return;
    }

    let text_w = (view.w * 0.32).max(160.0);
    let center = vec2(view.center_x(), view.center_y());

    // Line 1: up and to the right
    if let Some(img) = page.get(ids::LINE1_IMG) {
        let a = element_alpha(img, now) * layer_alpha;
        if a > 0.0 {
            draw_callout(center + vec2(view.w * 0.08, -view.h * 0.08), vec2(view.right() - text_w - 24.0, view.y + view.h * 0.18), a);
        }
    }
    if let Some(t1) = page.get(ids::LINE1_TEXT) {
        let rect = Rect::new(view.right() - text_w - 16.0, view.y + view.h * 0.18, text_w, 120.0);
        draw_wrapped(&t1.text, rect, t1.caret, now, layer_alpha);
    }

    // Line 2: down and to the left
    if let Some(img) = page.get(ids::LINE2_IMG) {
        let a = element_alpha(img, now) * layer_alpha;
        if a > 0.0 {
            draw_callout(center + vec2(-view.w * 0.08, view.h * 0.06), vec2(view.x + text_w + 24.0, view.y + view.h * 0.62), a);
        }
    }
    if let Some(t2) = page.get(ids::LINE2_TEXT) {
        let rect = Rect::new(view.x + 16.0, view.y + view.h * 0.62, text_w, 120.0);
        draw_wrapped(&t2.text, rect, t2.caret, now, layer_alpha);
    }
}

fn draw_loading(page: &Page, view: Rect, now: Millis) {
    let Some(loading) = page.get(ids::LOADING) else {
        return;
    };
    let alpha = element_alpha(loading, now);
    if alpha <= 0.0 {
        return;
    }
    let dims = measure_text(&loading.text, None, theme::FONT_SIZE_CONTENT as u16, 1.0);
    draw_text(
        &loading.text,
        (view.center_x() - dims.width * 0.5).round(),
        (view.center_y() + 40.0).round(),
        theme::FONT_SIZE_CONTENT,
        with_alpha(theme::TEXT_DIM, alpha),
    );
    // Spinner
    let angle = (now / 1000.0 * std::f64::consts::TAU) as f32;
    let (s, c) = angle.sin_cos();
    draw_circle_lines(view.center_x(), view.center_y(), 16.0, 2.0, with_alpha(theme::TEXT_DIM, alpha * 0.4));
    draw_circle(view.center_x() + c * 16.0, view.center_y() + s * 16.0, 4.0, with_alpha(theme::BRAND, alpha));
}

fn draw_checkbox(ctx: &mut UiContext, element: &mut Element, rect: Rect) -> bool {
    let mut changed = false;
    if element.interactive() && ctx.take_click(&rect) {
        element.checked = !element.checked;
        changed = true;
    }
    let box_rect = Rect::new(rect.x, rect.center_y() - 9.0, 18.0, 18.0);
    draw_rectangle_lines(box_rect.x, box_rect.y, box_rect.w, box_rect.h, 2.0, theme::TEXT_COLOR);
    if element.checked {
        let inner = box_rect.pad(4.0);
        draw_rectangle(inner.x, inner.y, inner.w, inner.h, theme::ACCENT);
    }
    draw_text(
        &element.text,
        (box_rect.right() + 8.0).round(),
        (rect.center_y() + 6.0).round(),
        theme::FONT_SIZE_SMALL,
        theme::TEXT_COLOR,
    );
    changed
}

/// Draw the layer above the viewer. `view` excludes the navigation bar.
pub fn draw_hud(ctx: &mut UiContext, page: &mut Page, view: Rect, now: Millis) -> Option<HudAction> {
    let mut action = None;
    let modal_open = page.is_visible(ids::COOKING_MODAL);

    draw_loading(page, view, now);
    draw_annotations(page, view, now);

    // Model visibility toggle, top left
    if let Some(toggle) = page.get_mut(ids::MODEL_TOGGLE) {
        if toggle.visible && !modal_open && draw_checkbox(ctx, toggle, Rect::new(view.x + 16.0, view.y + 16.0, 120.0, 28.0)) {
            action = Some(HudAction::ModelToggled(toggle.checked));
        }
    }

    // Glass mode badge, top right
    if let Some(glass) = page.get(ids::GLASS_TOGGLE) {
        let alpha = element_alpha(glass, now);
        if alpha > 0.0 {
            let rect = Rect::new(view.right() - 116.0, view.y + 16.0, 100.0, 28.0);
            draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.5, with_alpha(theme::ACCENT, alpha));
            let dims = measure_text(&glass.text, None, theme::FONT_SIZE_SMALL as u16, 1.0);
            draw_text(
                &glass.text,
                (rect.center_x() - dims.width * 0.5).round(),
                (rect.center_y() + dims.height * 0.5).round(),
                theme::FONT_SIZE_SMALL,
                with_alpha(theme::ACCENT, alpha),
            );
        }
    }

    // Start button, bottom center
    if let Some(start) = page.get(ids::START_BUTTON) {
        if start.visible {
            let rect = Rect::new(view.center_x() - 90.0, view.bottom() - 88.0, 180.0, 48.0);
            let alpha = element_alpha(start, now) * if start.dimmed { 0.6 } else { 1.0 };
            draw_button(rect, &start.text, alpha);
            if start.interactive() && ctx.take_click(&rect) {
                action = Some(HudAction::Start);
            }
        }
    }

    // Hand-off modal
    let modal = page.get(ids::COOKING_MODAL).filter(|m| m.visible);
    if let Some(modal) = modal {
        let alpha = element_alpha(modal, now);
        draw_rectangle(view.x, view.y, view.w, view.h, with_alpha(theme::MODAL_SHADE, alpha));
        let card = view.centered(view.w.min(360.0), 200.0);
        draw_rectangle(card.x, card.y, card.w, card.h, with_alpha(theme::MODAL_BG, alpha));
        let dims = measure_text(&modal.text, None, theme::FONT_SIZE_HEADER as u16, 1.0);
        draw_text(
            &modal.text,
            (card.center_x() - dims.width * 0.5).round(),
            (card.y + 64.0).round(),
            theme::FONT_SIZE_HEADER,
            with_alpha(theme::TEXT_COLOR, alpha),
        );

        if let Some(cook) = page.get(ids::COOK_START) {
            let rect = Rect::new(card.center_x() - 90.0, card.bottom() - 72.0, 180.0, 48.0);
            draw_button(rect, &cook.text, alpha);
            if cook.interactive() && ctx.take_click(&rect) {
                action = Some(HudAction::CookStart);
            }
        }
        // The modal swallows every other click on the view
        if ctx.mouse.left_pressed && ctx.mouse.inside(&view) {
            ctx.press_consumed = true;
        }
    }

    action
}

/// Screen split into the viewer area and the navigation bar
pub fn layout(screen: Rect) -> (Rect, Rect) {
    let nav = screen.slice_bottom(tabbar::layout::BAR_HEIGHT);
    (screen.remaining_after_bottom(tabbar::layout::BAR_HEIGHT), nav)
}
