//! Entry point for the **nomouse** daemon.
//!
//! Spawns the configured [`CommandSource`](nomouse::traits::CommandSource)s
//! on background threads and processes the merged event queue on the main
//! thread.
//!
//! When the `visualizer-gtk` feature is enabled the main thread runs the
//! GLib main loop (GTK4 requires it) and polls the event queue from there.
//! Without the feature, a simple blocking loop is used instead and the
//! overlay is invisible — useful for headless testing over the socket.

use nomouse::command::Command;
use nomouse::config::Config;
use nomouse::controller::{Event, SessionController};
use nomouse::ipc::listener::UnixSocketListener;
use nomouse::timer::ResetTimer;
use nomouse::traits::{CommandSource, OverlayEvent, PointerSink, ScreenSource};
use log::{error, info};
use std::sync::mpsc;
use std::time::Duration;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/nomouse.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/nomouse`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("nomouse")
}

/// Try to load the config from `$XDG_CONFIG_HOME/nomouse/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Debug backends (--debug-overlay-only, backend-less builds)

mod debug_backend {
    use log::info;
    use nomouse::config::ScreenConfig;
    use nomouse::traits::{PointerSink, ScreenRect, ScreenSource};

    #[derive(Debug, thiserror::Error)]
    #[error("debug backend")]
    pub struct DebugBackendError;

    /// Pointer sink that logs instead of injecting.
    pub struct LoggingPointer;

    impl PointerSink for LoggingPointer {
        type Error = DebugBackendError;

        fn move_to(&self, x: i32, y: i32) -> Result<(), DebugBackendError> {
            info!("(debug) move to ({}, {})", x, y);
            Ok(())
        }

        fn click(&self, x: i32, y: i32) -> Result<(), DebugBackendError> {
            info!("(debug) click at ({}, {})", x, y);
            Ok(())
        }
    }

    /// Screen source backed by the config's fallback rectangle.
    pub struct ConfigScreen(ScreenRect);

    impl ConfigScreen {
        pub fn new(screen: ScreenConfig) -> Self {
            Self(ScreenRect {
                width: screen.width,
                height: screen.height,
            })
        }
    }

    impl ScreenSource for ConfigScreen {
        type Error = DebugBackendError;

        fn primary_screen(&self) -> Result<ScreenRect, DebugBackendError> {
            Ok(self.0)
        }
    }
}

use debug_backend::{ConfigScreen, LoggingPointer};

//  Main

fn main() {
    env_logger::init();

    let debug_overlay = std::env::args().any(|a| a == "--debug-overlay-only");

    if debug_overlay {
        run_debug_overlay();
    } else {
        run_daemon();
    }
}

/// Normal daemon mode.
fn run_daemon() {
    let config = load_config();

    #[cfg(feature = "pointer-x11")]
    {
        use nomouse::x11::{X11Pointer, X11Screen};

        let pointer = match X11Pointer::new() {
            Ok(p) => p,
            Err(e) => {
                error!("pointer backend failed: {}", e);
                std::process::exit(1);
            }
        };
        run(pointer, X11Screen::new(), config);
    }

    #[cfg(not(feature = "pointer-x11"))]
    {
        log::warn!("built without `pointer-x11`; pointer actions are logged only");
        let screen = ConfigScreen::new(config.screen);
        run(LoggingPointer, screen, config);
    }
}

/// Debug-overlay-only mode: show the grid, log clicks instead of injecting.
fn run_debug_overlay() {
    let config = load_config();

    info!("running in debug-overlay-only mode (no pointer injection)");

    let screen = ConfigScreen::new(config.screen);
    run(LoggingPointer, screen, config);
}

/// Wire the controller to its queue, spawn sources, enter the event loop.
fn run<P, S>(pointer: P, screen: S, config: Config)
where
    P: PointerSink + 'static,
    S: ScreenSource + 'static,
{
    let (event_tx, event_rx) = mpsc::channel::<Event>();
    let timer = ResetTimer::new(
        event_tx.clone(),
        Duration::from_millis(config.input.timeout_ms),
    );
    let overlay_config = config.overlay.clone();
    let mut controller = SessionController::new(pointer, screen, config, timer);

    let (overlay_tx, overlay_rx) = mpsc::channel::<OverlayEvent>();
    controller.set_overlay(overlay_tx);

    spawn_command_sources(event_tx.clone());

    start_event_loop(controller, event_rx, event_tx, overlay_rx, overlay_config);
}

//  Event loops

#[cfg(feature = "visualizer-gtk")]
fn start_event_loop<P, S>(
    controller: SessionController<P, S>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    overlay_rx: mpsc::Receiver<OverlayEvent>,
    overlay_config: nomouse::config::OverlayConfig,
) where
    P: PointerSink + 'static,
    S: ScreenSource + 'static,
{
    nomouse::visualizer::gtk::run_main_loop(
        controller,
        event_rx,
        event_tx,
        overlay_rx,
        overlay_config,
    );
}

#[cfg(not(feature = "visualizer-gtk"))]
fn start_event_loop<P, S>(
    mut controller: SessionController<P, S>,
    event_rx: mpsc::Receiver<Event>,
    _event_tx: mpsc::Sender<Event>,
    _overlay_rx: mpsc::Receiver<OverlayEvent>,
    _overlay_config: nomouse::config::OverlayConfig,
) where
    P: PointerSink + 'static,
    S: ScreenSource + 'static,
{
    info!("nomouse running (headless)");
    for event in event_rx {
        let is_shutdown = matches!(event, Event::Shutdown);
        if let Err(e) = controller.dispatch(event) {
            error!("event error: {}", e);
        }
        if is_shutdown {
            break;
        }
    }
    info!("all command sources closed, exiting");
}

//  Helpers

/// Spawn every command source and the funnel that serializes their output
/// onto the controller's event queue.
fn spawn_command_sources(event_tx: mpsc::Sender<Event>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

    {
        let path = default_socket_path();
        std::thread::spawn(move || {
            let mut source = UnixSocketListener::new(&path);
            if let Err(e) = source.run(cmd_tx) {
                error!("socket listener error: {}", e);
            }
        });
    }

    // Commands and deadlines share one ordered queue; when the last source
    // hangs up, a final Shutdown wakes the loop so it can close any open
    // overlay before exiting.
    std::thread::spawn(move || {
        for cmd in cmd_rx {
            if event_tx.send(Event::Command(cmd)).is_err() {
                return;
            }
        }
        let _ = event_tx.send(Event::Shutdown);
    });
}
