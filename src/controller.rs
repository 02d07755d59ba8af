//! The main orchestrator that ties sessions, backends, and event sources
//! together.
//!
//! [`SessionController`] owns the single optional [`OverlaySession`] handle —
//! the "at most one overlay" rule is this `Option`, not a global — and
//! reacts to [`Event`]s by driving the session and issuing calls to the
//! [`PointerSink`] trait.  All events, whether they started on a listener
//! thread or a timer thread, are applied here one at a time in arrival
//! order.

use crate::command::{Command, KeyPress};
use crate::config::Config;
use crate::grid::{GridError, GridSpec};
use crate::session::{OverlaySession, SessionAction};
use crate::timer::ResetTimer;
use crate::traits::{OverlayEvent, PointerSink, ScreenSource};
use log::{debug, info, warn};
use std::sync::mpsc;

/// Everything that can arrive on the controller's event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A command from some [`CommandSource`](crate::traits::CommandSource).
    Command(Command),
    /// The inactivity deadline armed for this generation expired.
    Deadline(u64),
    /// Every command source has closed; close any open session and exit the
    /// event loop.
    Shutdown,
}

/// Possible errors from the controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The screen source could not report a rectangle.
    #[error("screen query failed: {0}")]
    Screen(String),

    /// The configured grid cannot be built.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// The pointer sink failed to move or click.
    #[error("pointer injection failed: {0}")]
    Pointer(String),
}

/// Orchestrates overlay sessions and pointer dispatch.
///
/// Generic over any [`PointerSink`] and [`ScreenSource`] implementation,
/// making it independent of X11 or any other concrete backend.
///
/// # Typical usage
///
/// ```ignore
/// let mut controller = SessionController::new(pointer, screen, config, timer);
/// controller.dispatch(Event::Command(Command::Show))?;
/// ```
pub struct SessionController<P: PointerSink, S: ScreenSource> {
    pointer: P,
    screen: S,
    config: Config,
    timer: ResetTimer,
    session: Option<OverlaySession>,
    /// Bumped on every deadline-relevant state change; a pending deadline
    /// carrying an older value is stale and gets dropped.
    generation: u64,
    overlay_tx: Option<mpsc::Sender<OverlayEvent>>,
}

impl<P: PointerSink, S: ScreenSource> SessionController<P, S> {
    /// Create a controller with no active session.
    pub fn new(pointer: P, screen: S, config: Config, timer: ResetTimer) -> Self {
        Self {
            pointer,
            screen,
            config,
            timer,
            session: None,
            generation: 0,
            overlay_tx: None,
        }
    }

    /// Attach an overlay renderer event channel.
    ///
    /// The controller will send [`OverlayEvent::Show`] when a session opens,
    /// [`OverlayEvent::Buffer`] after every buffer change, and
    /// [`OverlayEvent::Hide`] when the session closes.  The receiver can be
    /// owned by any independent listener — the GTK overlay, a test collector.
    pub fn set_overlay(&mut self, tx: mpsc::Sender<OverlayEvent>) {
        self.overlay_tx = Some(tx);
    }

    /// Whether an overlay session is currently active.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Process a single queue event.
    pub fn dispatch(&mut self, event: Event) -> Result<(), ControllerError> {
        match event {
            Event::Command(cmd) => self.handle(cmd),
            Event::Deadline(generation) => {
                self.handle_deadline(generation);
                Ok(())
            }
            Event::Shutdown => {
                self.shutdown();
                Ok(())
            }
        }
    }

    /// Process a single [`Command`].
    pub fn handle(&mut self, cmd: Command) -> Result<(), ControllerError> {
        match cmd {
            Command::Show => self.show(),
            Command::Hide => {
                self.close_session();
                Ok(())
            }
            Command::Key(key) => self.handle_key(key),
        }
    }

    /// Apply an expired deadline, unless it is stale.
    pub fn handle_deadline(&mut self, generation: u64) {
        if generation != self.generation {
            debug!(
                "dropping stale deadline (gen {} != {})",
                generation, self.generation
            );
            return;
        }
        if let Some(session) = self.session.as_mut() {
            info!("input timed out, clearing buffer");
            let action = session.handle_deadline();
            // Clearing the buffer cannot touch the pointer, so this cannot fail.
            let _ = self.apply(action);
        }
    }

    /// Close any open session; called before the controller is dropped so the
    /// overlay never outlives its event loop.
    pub fn shutdown(&mut self) {
        self.close_session();
    }

    //  Internal

    /// Create and show a session, unless one is already visible.
    fn show(&mut self) -> Result<(), ControllerError> {
        if self.session.is_some() {
            debug!("overlay already visible, ignoring show");
            return Ok(());
        }
        let rect = self
            .screen
            .primary_screen()
            .map_err(|e| ControllerError::Screen(e.to_string()))?;
        let spec = GridSpec {
            rows: self.config.grid.rows,
            cols: self.config.grid.cols,
            screen_width: rect.width,
            screen_height: rect.height,
        };
        let session = OverlaySession::new(spec, self.config.input.click_offset_y)?;
        info!(
            "overlay shown: {}x{} cells over {}x{}px",
            spec.rows, spec.cols, rect.width, rect.height
        );
        self.send_overlay(OverlayEvent::Show(session.view()));
        self.session = Some(session);
        Ok(())
    }

    /// Forward a key press to the active session, if any.
    fn handle_key(&mut self, key: KeyPress) -> Result<(), ControllerError> {
        let Some(session) = self.session.as_mut() else {
            debug!("key press with no overlay, ignoring");
            return Ok(());
        };
        let action = session.handle_key(key);
        self.apply(action)
    }

    /// Carry out what the session asked for.
    fn apply(&mut self, action: SessionAction) -> Result<(), ControllerError> {
        match action {
            SessionAction::Continue => Ok(()),

            SessionAction::Refresh => {
                self.generation = self.generation.wrapping_add(1);
                let (buffer, partial) = match &self.session {
                    Some(s) => (s.buffer(), s.awaiting_second_letter()),
                    None => return Ok(()),
                };
                if partial {
                    self.timer.arm(self.generation);
                }
                self.send_overlay(OverlayEvent::Buffer(buffer));
                Ok(())
            }

            SessionAction::MoveAndClick { x, y } => {
                info!("dispatching click at ({}, {})", x, y);
                let result = self
                    .pointer
                    .move_to(x, y)
                    .and_then(|_| self.pointer.click(x, y))
                    .map_err(|e| ControllerError::Pointer(e.to_string()));
                if result.is_err() {
                    warn!("pointer dispatch failed, closing overlay anyway");
                }
                // The session ends on every dispatch path, successful or not.
                self.close_session();
                result
            }

            SessionAction::Close => {
                self.close_session();
                Ok(())
            }
        }
    }

    /// Drop the session, invalidate any pending deadline, hide the overlay.
    fn close_session(&mut self) {
        if self.session.take().is_some() {
            self.generation = self.generation.wrapping_add(1);
            self.send_overlay(OverlayEvent::Hide);
            info!("overlay closed");
        }
    }

    fn send_overlay(&self, event: OverlayEvent) {
        if let Some(tx) = &self.overlay_tx {
            let _ = tx.send(event);
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ScreenRect;
    use std::cell::RefCell;
    use std::sync::mpsc;
    use std::time::Duration;

    /// Record-keeping mock pointer sink.
    #[derive(Debug, Default)]
    struct RecorderPointer {
        moves: RefCell<Vec<(i32, i32)>>,
        clicks: RefCell<Vec<(i32, i32)>>,
        fail: bool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("recorder pointer error")]
    struct RecorderErr;

    impl PointerSink for RecorderPointer {
        type Error = RecorderErr;

        fn move_to(&self, x: i32, y: i32) -> Result<(), RecorderErr> {
            if self.fail {
                return Err(RecorderErr);
            }
            self.moves.borrow_mut().push((x, y));
            Ok(())
        }

        fn click(&self, x: i32, y: i32) -> Result<(), RecorderErr> {
            if self.fail {
                return Err(RecorderErr);
            }
            self.clicks.borrow_mut().push((x, y));
            Ok(())
        }
    }

    /// Fixed-rectangle screen source.
    struct FixedScreen(ScreenRect);

    #[derive(Debug, thiserror::Error)]
    #[error("fixed screen error")]
    struct FixedScreenErr;

    impl ScreenSource for FixedScreen {
        type Error = FixedScreenErr;

        fn primary_screen(&self) -> Result<ScreenRect, FixedScreenErr> {
            Ok(self.0)
        }
    }

    type TestController = SessionController<RecorderPointer, FixedScreen>;

    fn make_controller() -> (TestController, mpsc::Receiver<Event>) {
        make_controller_with(RecorderPointer::default(), Config::default())
    }

    fn make_controller_with(
        pointer: RecorderPointer,
        config: Config,
    ) -> (TestController, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel();
        let timer = ResetTimer::new(tx, Duration::from_millis(25));
        let screen = FixedScreen(ScreenRect {
            width: 2600,
            height: 2600,
        });
        (SessionController::new(pointer, screen, config, timer), rx)
    }

    fn key(c: char) -> Command {
        Command::Key(KeyPress::Char(c))
    }

    #[test]
    fn show_creates_one_session() {
        let (mut c, _rx) = make_controller();
        assert!(!c.is_active());
        c.handle(Command::Show).unwrap();
        assert!(c.is_active());
    }

    #[test]
    fn show_is_idempotent_while_active() {
        let (mut c, _rx) = make_controller();
        c.handle(Command::Show).unwrap();
        c.handle(key('a')).unwrap();
        // A second hotkey must not reset the in-progress buffer.
        c.handle(Command::Show).unwrap();
        c.handle(key('a')).unwrap();
        // "AA" completed across the duplicate Show: the click happened.
        assert_eq!(c.pointer.clicks.borrow().len(), 1);
        assert!(!c.is_active());
    }

    #[test]
    fn matched_code_moves_clicks_and_closes() {
        let (mut c, _rx) = make_controller();
        c.handle(Command::Show).unwrap();
        c.handle(key('a')).unwrap();
        c.handle(key('a')).unwrap();
        // 26x26 over 2600px: AA centered at (50, 50); default offset +18.
        assert_eq!(c.pointer.moves.borrow().as_slice(), &[(50, 68)]);
        assert_eq!(c.pointer.clicks.borrow().as_slice(), &[(50, 68)]);
        assert!(!c.is_active());
    }

    #[test]
    fn escape_closes_with_zero_pointer_calls() {
        let (mut c, _rx) = make_controller();
        c.handle(Command::Show).unwrap();
        c.handle(key('a')).unwrap();
        c.handle(Command::Key(KeyPress::Escape)).unwrap();
        assert!(!c.is_active());
        assert!(c.pointer.moves.borrow().is_empty());
        assert!(c.pointer.clicks.borrow().is_empty());
    }

    #[test]
    fn hide_command_closes_without_dispatch() {
        let (mut c, _rx) = make_controller();
        c.handle(Command::Show).unwrap();
        c.handle(Command::Hide).unwrap();
        assert!(!c.is_active());
        assert!(c.pointer.clicks.borrow().is_empty());
    }

    #[test]
    fn rejected_code_keeps_session_open() {
        let mut config = Config::default();
        config.grid.rows = 3;
        config.grid.cols = 3;
        let (mut c, _rx) = make_controller_with(RecorderPointer::default(), config);
        c.handle(Command::Show).unwrap();
        c.handle(key('z')).unwrap();
        c.handle(key('z')).unwrap();
        assert!(c.is_active());
        assert!(c.pointer.clicks.borrow().is_empty());
    }

    #[test]
    fn oversized_grid_config_fails_show() {
        let mut config = Config::default();
        config.grid.rows = 27;
        let (mut c, _rx) = make_controller_with(RecorderPointer::default(), config);
        let err = c.handle(Command::Show).unwrap_err();
        assert!(matches!(err, ControllerError::Grid(_)));
        assert!(!c.is_active());
    }

    #[test]
    fn key_with_no_session_is_ignored() {
        let (mut c, _rx) = make_controller();
        c.handle(key('a')).unwrap();
        assert!(c.pointer.clicks.borrow().is_empty());
    }

    #[test]
    fn pointer_failure_still_closes_the_session() {
        let pointer = RecorderPointer {
            fail: true,
            ..Default::default()
        };
        let (mut c, _rx) = make_controller_with(pointer, Config::default());
        c.handle(Command::Show).unwrap();
        c.handle(key('a')).unwrap();
        let err = c.handle(key('a')).unwrap_err();
        assert!(matches!(err, ControllerError::Pointer(_)));
        assert!(!c.is_active(), "session must not leak after a failed click");
    }

    //  Deadlines

    #[test]
    fn deadline_arrives_on_the_event_queue() {
        let (mut c, rx) = make_controller();
        c.handle(Command::Show).unwrap();
        c.handle(key('a')).unwrap();
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let Event::Deadline(generation) = event else {
            panic!("expected a deadline, got {:?}", event);
        };
        c.dispatch(Event::Deadline(generation)).unwrap();
        assert!(c.is_active(), "timeout keeps the overlay open");
    }

    #[test]
    fn current_deadline_clears_the_buffer() {
        let (mut c, rx) = make_controller();
        c.handle(Command::Show).unwrap();
        c.handle(key('a')).unwrap();
        let Event::Deadline(generation) = rx.recv_timeout(Duration::from_secs(2)).unwrap() else {
            unreachable!();
        };
        c.handle_deadline(generation);
        // Buffer cleared: the next two letters form a fresh pair.
        c.handle(key('b')).unwrap();
        c.handle(key('a')).unwrap();
        // "BA" is row 1, col 0 -> center (50, 150), click offset +18.
        assert_eq!(c.pointer.clicks.borrow().as_slice(), &[(50, 168)]);
    }

    #[test]
    fn stale_deadline_is_dropped() {
        let (mut c, rx) = make_controller();
        c.handle(Command::Show).unwrap();
        c.handle(key('a')).unwrap();
        let Event::Deadline(stale) = rx.recv_timeout(Duration::from_secs(2)).unwrap() else {
            unreachable!();
        };
        // A later keystroke re-armed the deadline before the first fired.
        c.handle(Command::Key(KeyPress::Backspace)).unwrap();
        c.handle(key('q')).unwrap();
        c.handle_deadline(stale);
        // The buffered Q must have survived the stale expiry.
        c.handle(key('x')).unwrap();
        assert_eq!(c.pointer.clicks.borrow().len(), 1);
    }

    #[test]
    fn deadline_after_close_is_dropped() {
        let (mut c, rx) = make_controller();
        c.handle(Command::Show).unwrap();
        c.handle(key('a')).unwrap();
        let Event::Deadline(generation) = rx.recv_timeout(Duration::from_secs(2)).unwrap() else {
            unreachable!();
        };
        c.handle(Command::Key(KeyPress::Escape)).unwrap();
        c.handle_deadline(generation);
        assert!(!c.is_active());
    }

    //  Overlay renderer integration

    fn collect_overlay_events(commands: &[Command]) -> Vec<OverlayEvent> {
        let (mut c, _rx) = make_controller();
        let (tx, rx) = mpsc::channel();
        c.set_overlay(tx);
        for cmd in commands {
            let _ = c.handle(*cmd);
        }
        rx.try_iter().collect()
    }

    #[test]
    fn show_emits_a_full_view() {
        let events = collect_overlay_events(&[Command::Show]);
        let [OverlayEvent::Show(view)] = events.as_slice() else {
            panic!("expected a single Show, got {:?}", events);
        };
        assert_eq!(view.labels.len(), 676);
        assert_eq!(view.screen.width, 2600);
        assert!(view.buffer.is_empty());
    }

    #[test]
    fn keystrokes_emit_buffer_updates() {
        let events = collect_overlay_events(&[Command::Show, key('a')]);
        assert!(
            matches!(
                events.as_slice(),
                [OverlayEvent::Show(_), OverlayEvent::Buffer(b)] if b == "A"
            ),
            "got {:?}",
            events
        );
    }

    #[test]
    fn match_emits_buffer_then_hide() {
        let events = collect_overlay_events(&[Command::Show, key('a'), key('a')]);
        assert!(
            matches!(
                events.as_slice(),
                [
                    OverlayEvent::Show(_),
                    OverlayEvent::Buffer(_),
                    OverlayEvent::Hide
                ]
            ),
            "got {:?}",
            events
        );
    }

    #[test]
    fn shutdown_event_closes_the_session() {
        let (mut c, _rx) = make_controller();
        c.handle(Command::Show).unwrap();
        c.handle(key('a')).unwrap();
        c.dispatch(Event::Shutdown).unwrap();
        assert!(!c.is_active());
        assert!(c.pointer.clicks.borrow().is_empty());
    }

    #[test]
    fn shutdown_hides_an_open_overlay() {
        let (mut c, _rx) = make_controller();
        let (tx, rx) = mpsc::channel();
        c.set_overlay(tx);
        c.handle(Command::Show).unwrap();
        c.shutdown();
        let events: Vec<OverlayEvent> = rx.try_iter().collect();
        assert!(matches!(
            events.as_slice(),
            [OverlayEvent::Show(_), OverlayEvent::Hide]
        ));
        assert!(!c.is_active());
    }
}
