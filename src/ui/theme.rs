//! UI Theme - Shared colors and styling constants

use macroquad::prelude::Color;

/// Viewer background behind the model and overlay
pub const BG_COLOR: Color = Color::new(0.06, 0.06, 0.08, 1.0);

/// Primary text color
pub const TEXT_COLOR: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Dimmed/secondary text
pub const TEXT_DIM: Color = Color::new(0.6, 0.6, 0.65, 1.0);

/// Active navigation tab (#F4CF15)
pub const ACCENT: Color = Color::new(0.957, 0.812, 0.082, 1.0);

/// Brand color, also the placeholder model's (#667eea)
pub const BRAND: Color = Color::new(0.4, 0.494, 0.918, 1.0);

/// Annotation callout lines
pub const CALLOUT_LINE: Color = Color::new(1.0, 1.0, 1.0, 0.85);

/// Button fill
pub const BUTTON_BG: Color = Color::new(0.957, 0.812, 0.082, 1.0);

/// Button label
pub const BUTTON_TEXT: Color = Color::new(0.08, 0.08, 0.1, 1.0);

/// Modal card
pub const MODAL_BG: Color = Color::new(0.12, 0.12, 0.15, 0.96);

/// Page shade behind the modal
pub const MODAL_SHADE: Color = Color::new(0.0, 0.0, 0.0, 0.45);

/// Bottom navigation bar
pub const NAV_BG: Color = Color::new(0.08, 0.08, 0.1, 0.92);

// =============================================================================
// Font Sizes
// =============================================================================

/// Header/title text size
pub const FONT_SIZE_HEADER: f32 = 28.0;

/// Standard content text size
pub const FONT_SIZE_CONTENT: f32 = 20.0;

/// Small/detail text size
pub const FONT_SIZE_SMALL: f32 = 16.0;

/// Fade time for elements shown or hidden through the page
pub const TRANSITION_MS: f64 = 300.0;
