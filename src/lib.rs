//! **nomouse** — keyboard-driven mouse positioning.
//!
//! A transparent overlay divides the primary screen into a grid of cells,
//! each labeled with a unique two-letter code.  Typing a code moves the
//! cursor to that cell's center and clicks; Escape dismisses the overlay; a
//! partial code times out after an inactivity deadline.
//!
//! # Architecture
//!
//! The crate is organised around three core traits:
//!
//! * [`traits::PointerSink`] — abstracts cursor movement and clicking so the
//!   session logic is not coupled to any specific injection backend.
//! * [`traits::ScreenSource`] — abstracts "how big is the primary screen",
//!   queried once per overlay session.
//! * [`traits::CommandSource`] — abstracts the transport that delivers
//!   user-intent (a Unix socket, a test harness, …) so the main loop is not
//!   coupled to any specific IPC mechanism.
//!
//! Concrete implementations live in [`x11`] (XTest pointer injection, Xlib
//! screen query) and [`ipc`] (Unix-socket command listener).  All state
//! mutation is funneled onto one ordered event queue consumed by
//! [`controller::SessionController`], so keystrokes and timer expiry are
//! applied one at a time in arrival order.

pub mod command;
pub mod config;
pub mod controller;
pub mod grid;
pub mod ipc;
pub mod matcher;
pub mod session;
pub mod timer;
pub mod traits;
pub mod visualizer;

#[cfg(feature = "pointer-x11")]
pub mod x11;
