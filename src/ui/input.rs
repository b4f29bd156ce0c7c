//! Input state for UI interaction

use super::Rect;

/// Mouse button state
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub left_down: bool,
    pub left_pressed: bool, // Just pressed this frame
    /// Movement since the previous frame
    pub dx: f32,
    pub dy: f32,
}

impl MouseState {
    /// Check if mouse is inside a rect
    pub fn inside(&self, rect: &Rect) -> bool {
        rect.contains(self.x, self.y)
    }

    /// Check if mouse just clicked inside a rect
    pub fn clicked(&self, rect: &Rect) -> bool {
        self.left_pressed && rect.contains(self.x, self.y)
    }
}

/// UI context passed through the frame
#[derive(Debug, Default)]
pub struct UiContext {
    pub mouse: MouseState,
    /// A widget took this frame's press; the viewer must not start a drag
    pub press_consumed: bool,
    /// A drag on the viewer is in progress
    pub dragging_view: bool,
}

impl UiContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset at start of frame (call before UI code)
    pub fn begin_frame(&mut self, mouse: MouseState) {
        self.mouse = mouse;
        self.press_consumed = false;

        // Clear dragging if mouse released
        if !self.mouse.left_down {
            self.dragging_view = false;
        }
    }

    /// Click inside `rect` this frame; marks the press as taken
    pub fn take_click(&mut self, rect: &Rect) -> bool {
        if !self.press_consumed && self.mouse.clicked(rect) {
            self.press_consumed = true;
            return true;
        }
        false
    }

    /// Drag movement for the viewer this frame, if a drag is on
    pub fn view_drag(&mut self) -> Option<(f32, f32)> {
        if self.mouse.left_pressed && !self.press_consumed {
            self.dragging_view = true;
            return None;
        }
        if self.dragging_view && self.mouse.left_down {
            return Some((self.mouse.dx, self.mouse.dy));
        }
        None
    }
}
