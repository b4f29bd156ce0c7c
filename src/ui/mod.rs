//! Immediate-mode UI for the onboarding screens
//!
//! Design principles:
//! - Immediate mode (drawn from page state every frame)
//! - Simple rectangle-based layout
//! - Macroquad integration for rendering

mod rect;
mod input;
mod tabbar;
mod theme;
pub mod hud;
pub mod page;

pub use rect::*;
pub use input::*;
pub use tabbar::*;
pub use theme::*;
pub use hud::{draw_hud, HudAction};
pub use page::{ids, Page};
