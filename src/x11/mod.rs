//! X11-specific implementations.
//!
//! This module provides concrete backends for the
//! [`PointerSink`](crate::traits::PointerSink) and
//! [`ScreenSource`](crate::traits::ScreenSource) traits, powered by Xlib and
//! the XTest extension.
//!
//! Nothing outside this module should reference X11 directly.

pub mod pointer;
pub mod screen;

pub use pointer::X11Pointer;
pub use screen::X11Screen;
