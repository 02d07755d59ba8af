//! GTK4 + layer-shell overlay that runs on the **main thread**.
//!
//! The overlay window spans the whole output on the `Overlay` layer-shell
//! layer with exclusive keyboard focus, so every key press lands here while
//! the grid is visible.  Drawing happens in a single [`gtk4::DrawingArea`]
//! draw func: one bold label per cell center and the in-progress buffer at
//! double size centered on screen, colors and sizing from
//! [`OverlayConfig`].
//!
//! Two channels feed the loop:
//!
//! * `event_rx` — the controller's ordered event queue (commands, deadlines,
//!   shutdown).  Drained and dispatched from a ~60 fps GLib tick.
//! * `overlay_rx` — [`OverlayEvent`]s the controller emits back; they drive
//!   window visibility and redraws.
//!
//! Keys captured by the window are pushed onto the same event queue as
//! socket commands, so the matcher still sees one serialized input stream.

use crate::command::{Command, KeyPress};
use crate::config::OverlayConfig;
use crate::controller::{Event, SessionController};
use crate::traits::{OverlayEvent, OverlayView, PointerSink, ScreenSource};
use gtk4::cairo;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

//  Default CSS

/// The window itself must stay transparent; everything visible is drawn in
/// the draw func.
const DEFAULT_CSS: &str = r#"
window,
window.background {
    background-color: transparent;
    background: none;
}
"#;

//  Key classification

/// Map a GDK keyval to the matcher's key vocabulary.
///
/// Returns `None` for keys the overlay does not react to (modifiers,
/// function keys, …); those are swallowed while the grid is visible so they
/// never reach the application underneath.
fn classify_key(keyval: gdk::Key) -> Option<KeyPress> {
    match keyval {
        gdk::Key::Escape => Some(KeyPress::Escape),
        gdk::Key::BackSpace => Some(KeyPress::Backspace),
        other => other.to_unicode().map(KeyPress::Char),
    }
}

//  Drawing

/// Draw one overlay snapshot: labels at cell centers, buffer at screen
/// center.
fn draw_overlay(
    cr: &cairo::Context,
    view: &OverlayView,
    config: &OverlayConfig,
) -> Result<(), cairo::Error> {
    let label_size =
        (view.cell_width.min(view.cell_height) / config.label_divisor.max(1)) as f64;

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

//  Public API

/// Run the GTK4 main loop on the **current** (main) thread.
///
/// Returns when every command source has closed and the shutdown event has
/// been processed.
pub fn run_main_loop<P, S>(
    mut controller: SessionController<P, S>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    overlay_rx: mpsc::Receiver<OverlayEvent>,
    config: OverlayConfig,
) where
    P: PointerSink + 'static,
    S: ScreenSource + 'static,
{
    gtk4::init().expect("failed to initialise GTK4");
    info!("GTK4 initialised on main thread");

    load_css();

    //  Layer-shell overlay window
    let window = gtk4::Window::new();
    window.init_layer_shell();
    window.set_layer(Layer::Overlay);
    window.set_namespace("nomouse");
    // Grab the keyboard while visible; the grid swallows all typing.
    window.set_keyboard_mode(KeyboardMode::Exclusive);
    window.set_decorated(false);
    window.remove_css_class("background");
    for edge in [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right] {
        window.set_anchor(edge, true);
    }

    //  Drawing surface
    let view: Rc<RefCell<Option<OverlayView>>> = Rc::new(RefCell::new(None));
    let area = gtk4::DrawingArea::new();
    {
        let view = view.clone();
        let config = config.clone();
        area.set_draw_func(move |_, cr, _, _| {
            if let Some(view) = view.borrow().as_ref() {
                if let Err(e) = draw_overlay(cr, view, &config) {
                    warn!("overlay draw failed: {}", e);
                }
            }
        });
    }
    window.set_child(Some(&area));

    //  Keyboard capture: into the same queue as socket commands
    let key_controller = gtk4::EventControllerKey::new();
    {
        let event_tx = event_tx.clone();
        key_controller.connect_key_pressed(move |_, keyval, _, _| {
            if let Some(key) = classify_key(keyval) {
                debug!("overlay key: {}", key);
                let _ = event_tx.send(Event::Command(Command::Key(key)));
            }
            // Swallow everything while the overlay has the keyboard.
            glib::Propagation::Stop
        });
    }
    window.add_controller(key_controller);

    //  Initial present maps the Wayland surface, then hide until shown
    window.present();
    window.set_visible(false);
    info!("overlay mapped (hidden)");

    //  Main event loop (~60 fps)
    let main_loop = glib::MainLoop::new(None, false);
    let loop_handle = main_loop.clone();
    glib::timeout_add_local(Duration::from_millis(16), move || {
        // 1. Drain the controller's event queue.
        let mut shutting_down = false;
        loop {
            match event_rx.try_recv() {
                Ok(event) => {
                    let is_shutdown = matches!(event, Event::Shutdown);
                    if let Err(e) = controller.dispatch(event) {
                        error!("event error: {}", e);
                    }
                    if is_shutdown {
                        shutting_down = true;
                        break;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    shutting_down = true;
                    break;
                }
            }
        }

        // 2. Drain overlay events the dispatches above produced.
        while let Ok(event) = overlay_rx.try_recv() {
            match event {
                OverlayEvent::Show(new_view) => {
                    debug!(
                        "SHOW {} labels over {}x{}",
                        new_view.labels.len(),
                        new_view.screen.width,
                        new_view.screen.height
                    );
                    *view.borrow_mut() = Some(new_view);
                    area.queue_draw();
                    window.set_visible(true);
                    window.present();
                }
                OverlayEvent::Buffer(buffer) => {
                    debug!("BUFFER {:?}", buffer);
                    if let Some(view) = view.borrow_mut().as_mut() {
                        view.buffer = buffer;
                    }
                    area.queue_draw();
                }
                OverlayEvent::Hide => {
                    debug!("HIDE");
                    *view.borrow_mut() = None;
                    window.set_visible(false);
                }
            }
        }

        if shutting_down {
            info!("all command sources closed — exiting");
            window.set_visible(false);
            loop_handle.quit();
            return glib::ControlFlow::Break;
        }
        glib::ControlFlow::Continue
    });

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");
}

//  CSS loading

fn load_css() {
    let provider = gtk4::CssProvider::new();

    #[allow(deprecated)]
    provider.load_from_data(DEFAULT_CSS);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    } else {
        warn!("no GDK display — CSS will not be applied");
    }
}
