//! Mock overlay demo — draws a 12×8 code grid with an input buffer that
//! **cycles** through empty, one, and two typed letters, using the same
//! label layout and double-size centered buffer as the real overlay.
//!
//! Run with:
//!     cargo run --bin nomouse-test-overlay
//!
//! Press Ctrl-C to quit.

use gtk4::cairo;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::{KeyboardMode, Layer, LayerShell};
use nomouse::config::OverlayConfig;
use nomouse::grid::GridSpec;
use nomouse::session::OverlaySession;
use nomouse::traits::OverlayView;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const ROWS: u16 = 8;
const COLS: u16 = 12;
const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

/// Milliseconds between buffer steps.
const STEP_MS: u64 = 800;

/// The input states the demo cycles through.
const BUFFER_STEPS: [&str; 3] = ["", "Q", "QX"];

const CSS: &str = r#"
window,
window.background {
    background-color: transparent;
    background: none;
}
"#;

fn draw(cr: &cairo::Context, view: &OverlayView, config: &OverlayConfig) -> Result<(), cairo::Error> {
    let label_size = (view.cell_width.min(view.cell_height) / config.label_divisor) as f64;

    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(label_size);
    let [r, g, b, a] = config.label_color;
    cr.set_source_rgba(r, g, b, a);

    for label in &view.labels {
        let text = label.code.to_string();
        let extents = cr.text_extents(&text)?;
        cr.move_to(
            label.x as f64 - extents.width() / 2.0,
            label.y as f64 + extents.height() / 2.0,
        );
        cr.show_text(&text)?;
    }

    if !view.buffer.is_empty() {
        cr.set_font_size(label_size * 2.0);
        let [r, g, b, a] = config.buffer_color;
        cr.set_source_rgba(r, g, b, a);
        let extents = cr.text_extents(&view.buffer)?;
        cr.move_to(
            view.screen.width as f64 / 2.0 - extents.width() / 2.0,
            view.screen.height as f64 / 2.0 + extents.height() / 2.0,
        );
        cr.show_text(&view.buffer)?;
    }

    Ok(())
}

fn main() {
    gtk4::init().expect("Failed to initialise GTK4");

    //  CSS
    let provider = gtk4::CssProvider::new();
    #[allow(deprecated)]
    provider.load_from_data(CSS);
    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }

    //  A real session provides the label layout
    let session = OverlaySession::new(
        GridSpec {
            rows: ROWS,
            cols: COLS,
            screen_width: WIDTH,
            screen_height: HEIGHT,
        },
        18,
    )
    .expect("demo grid spec is valid");

    let view: Rc<RefCell<OverlayView>> = Rc::new(RefCell::new(session.view()));
    let config = OverlayConfig::default();

    //  Layer-shell window
    let window = gtk4::Window::new();
    window.init_layer_shell();
    window.set_layer(Layer::Overlay);
    window.set_namespace("nomouse-test");
    window.set_keyboard_mode(KeyboardMode::None);
    window.set_decorated(false);
    window.remove_css_class("background");
    window.set_default_size(WIDTH as i32, HEIGHT as i32);

    let area = gtk4::DrawingArea::new();
    area.set_content_width(WIDTH as i32);
    area.set_content_height(HEIGHT as i32);
    {
        let view = view.clone();
        area.set_draw_func(move |_, cr, _, _| {
            if let Err(e) = draw(cr, &view.borrow(), &config) {
                eprintln!("draw failed: {}", e);
            }
        });
    }
    window.set_child(Some(&area));
    window.present();

    //  Step timer: advance the mock buffer
    {
        let view = view.clone();
        let step = Rc::new(RefCell::new(0usize));
        glib::timeout_add_local(Duration::from_millis(STEP_MS), move || {
            let mut step = step.borrow_mut();
            *step = (*step + 1) % BUFFER_STEPS.len();
            view.borrow_mut().buffer = BUFFER_STEPS[*step].to_string();
            area.queue_draw();
            glib::ControlFlow::Continue
        });
    }

    eprintln!("Mock overlay running — code labels plus a cycling input buffer.");
    eprintln!("Press Ctrl-C to quit.");

    let main_loop = glib::MainLoop::new(None, false);
    main_loop.run();
}
