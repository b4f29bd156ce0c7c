//! Product Reveal: an onboarding experience for a pair of smart glasses
//!
//! A tabbed screen with full-screen background clips, and a 3D viewer that
//! runs a scripted reveal:
//! - Annotated callouts typed over the model
//! - A flip with a synchronized fade-out on "Start"
//! - Fade back in, then a slow left/right pan
//! - Hand-off to the cooking screen

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod anim;
mod annotation;
mod app;
mod config;
mod event;
mod overlay;
mod scene;
mod tabs;
mod ui;
mod viewer;

use std::path::PathBuf;

use clap::Parser;
use macroquad::prelude::*;

use app::{Screen, Session};
use config::{RevealConfig, DEFAULT_CONFIG_PATH};
use overlay::FrameSequenceSurface;
use scene::{ModelRenderer, PendingModel};
use ui::{draw_hud, draw_nav_bar, hud, MouseState, Rect, UiContext};

/// Framebuffer resolution relative to the window
const RENDER_SCALE: f32 = 0.5;

#[derive(Parser, Debug)]
#[command(version, about = "Onboarding reveal for a 3D product model")]
struct Args {
    /// RON configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// OBJ model to show instead of the configured one
    #[arg(long)]
    model: Option<PathBuf>,

    /// Hide flat HUD/display plates baked into the model
    #[arg(long)]
    hide_hud_panels: bool,

    /// Allow rotating the model by dragging
    #[arg(long)]
    allow_user_rotate: bool,
}

impl Args {
    fn apply(&self, config: &mut RevealConfig) {
        if let Some(model) = &self.model {
            config.model.path = model.clone();
        }
        if self.hide_hud_panels {
            config.model.hide_hud_panels = true;
        }
        if self.allow_user_rotate {
            config.model.allow_user_rotate = true;
        }
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Product Reveal v{}", VERSION),
        window_width: 1280,
        window_height: 800,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn now_ms() -> f64 {
    get_time() * 1000.0
}

fn aspect_of(view: Rect) -> f32 {
    view.w / view.h.max(1.0)
}

/// Follow-on screen: the active tab's panel
fn draw_panel(session: &Session<FrameSequenceSurface>, view: Rect) {
    let Some(tab) = session.tabs.active() else {
        return;
    };
    if !session.page.is_visible(&tab.panel) {
        return;
    }
    draw_text(
        &tab.label,
        (view.x + 32.0).round(),
        (view.y + 64.0).round(),
        ui::FONT_SIZE_HEADER,
        ui::TEXT_COLOR,
    );
    draw_line(view.x + 32.0, view.y + 80.0, view.x + 160.0, view.y + 80.0, 2.0, ui::ACCENT);
}

#[macroquad::main(window_conf)]
async fn main() {
    // Logging and crash reports first
    #[cfg(not(target_arch = "wasm32"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_millis()
            .init();
        crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);
    }

    #[cfg(not(target_arch = "wasm32"))]
    let args = Args::parse();
    // No command line in the browser
    #[cfg(target_arch = "wasm32")]
    let args = Args::parse_from(["product-reveal"]);

    let mut config = RevealConfig::load_or_default(&args.config);
    args.apply(&mut config);
    log::info!("Product Reveal v{} (model {})", VERSION, config.model.path.display());

    #[cfg(not(target_arch = "wasm32"))]
    let pending = PendingModel::spawn(config.model.path.clone());
    #[cfg(target_arch = "wasm32")]
    let pending = PendingModel::fetch(config.model.path.clone()).await;

    let (view, _) = hud::layout(Rect::screen(screen_width(), screen_height()));
    let mut session = Session::new(&config, FrameSequenceSurface::new(), pending, aspect_of(view), now_ms());

    let mut ctx = UiContext::new();
    let mut renderer = ModelRenderer::new(RENDER_SCALE);
    let mut last_size = (screen_width(), screen_height());
    let mut last_mouse = mouse_position();

    loop {
        let now = now_ms();
        let screen = Rect::screen(screen_width(), screen_height());
        let (view, nav) = hud::layout(screen);

        if (screen.w, screen.h) != last_size {
            last_size = (screen.w, screen.h);
            session.resize(aspect_of(view));
        }

        let mouse = mouse_position();
        ctx.begin_frame(MouseState {
            x: mouse.0,
            y: mouse.1,
            left_down: is_mouse_button_down(MouseButton::Left),
            left_pressed: is_mouse_button_pressed(MouseButton::Left),
            dx: mouse.0 - last_mouse.0,
            dy: mouse.1 - last_mouse.1,
        });
        last_mouse = mouse;

        session.update(now);

        clear_background(ui::BG_COLOR);
        session.overlay.draw(screen);

        match session.screen {
            Screen::Onboarding => {
                let viewer = &session.viewer.session;
                if let Some(model) = viewer.model.as_ref().filter(|m| m.visible) {
                    renderer.draw(model, &viewer.camera, view.w, view.h);
                }
                if let Some(action) = draw_hud(&mut ctx, &mut session.page, view, now) {
                    session.handle_hud(action, now);
                }
                if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::Space) {
                    session.request_start(now);
                }
            }
            Screen::Cooking => draw_panel(&session, view),
        }

        if let Some(index) = draw_nav_bar(&mut ctx, nav, session.tabs.tabs()) {
            session.select_tab(index, now);
        }

        // Whatever press is left over belongs to the viewer
        if session.screen == Screen::Onboarding {
            if let Some((dx, dy)) = ctx.view_drag() {
                session.drag(dx, dy);
            }
        }

        next_frame().await;
    }
}
