//! Core traits that decouple nomouse from any specific input backend or
//! transport mechanism.
//!
//! Every concrete backend (the X11 pointer injector, the Unix-socket
//! listener, a test harness, …) implements one of these traits.  The
//! [`SessionController`](crate::controller::SessionController) only depends
//! on these abstractions.

use crate::command::Command;
use crate::grid::Code;
use std::sync::mpsc;

/// Abstraction over cursor movement and clicking.
///
/// An implementation might synthesize X11 input via XTest, or it might be a
/// recording stub used in tests. Coordinates are absolute pixels on the
/// primary screen.
pub trait PointerSink {
    /// The error type produced by this sink.
    type Error: std::error::Error + Send + 'static;

    /// Move the cursor to `(x, y)`.
    fn move_to(&self, x: i32, y: i32) -> Result<(), Self::Error>;

    /// Press and release the primary button at `(x, y)`.
    ///
    /// Called after [`move_to`](PointerSink::move_to) with the same target.
    fn click(&self, x: i32, y: i32) -> Result<(), Self::Error>;
}

/// The primary display's pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Abstraction over "how big is the primary screen right now".
///
/// Queried once per overlay session, immediately before the grid is built,
/// so resolution changes are picked up on the next show.
pub trait ScreenSource {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// The current primary screen rectangle.
    fn primary_screen(&self) -> Result<ScreenRect, Self::Error>;
}

//  Overlay renderer

/// One label the renderer draws at a cell center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLabel {
    /// The two-letter code to draw.
    pub code: Code,
    /// X pixel coordinate of the label anchor (cell center).
    pub x: i32,
    /// Y pixel coordinate of the label anchor (cell center).
    pub y: i32,
}

/// Everything the renderer needs to draw one overlay.
///
/// A read-only snapshot: labels at cell centers plus the in-progress input
/// buffer shown centered on screen. Label positions are the *display*
/// anchors — the click offset applied to the pointer target is deliberately
/// not part of this snapshot.
#[derive(Debug, Clone)]
pub struct OverlayView {
    /// The screen rectangle the overlay covers.
    pub screen: ScreenRect,
    /// Cell width in pixels (drives label font sizing).
    pub cell_width: u32,
    /// Cell height in pixels.
    pub cell_height: u32,
    /// One label per grid cell, row-major.
    pub labels: Vec<CellLabel>,
    /// The partial input buffer at snapshot time (possibly empty).
    pub buffer: String,
}

/// Events sent from the [`SessionController`](crate::controller::SessionController)
/// to an overlay renderer over an [`mpsc`](std::sync::mpsc) channel.
///
/// The renderer is a pure consumer: it draws what these events describe and
/// never feeds state back. Any listener — the GTK overlay, a debug logger,
/// a test collector — can own the receiving end.
#[derive(Debug, Clone)]
pub enum OverlayEvent {
    /// A session opened: draw the full label grid and (empty) buffer.
    Show(OverlayView),

    /// The partial input buffer changed; redraw it over the existing grid.
    Buffer(String),

    /// The session closed; remove the overlay from the screen.
    Hide,
}

//  Command source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport — a Unix socket, an in-memory
/// channel, a test harness — and forward every received command into the
/// provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// Blocks the calling thread; run each source on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
