//! Overlay renderers for the code grid.
//!
//! When the `visualizer-gtk` feature is enabled, [`gtk::run_main_loop`]
//! takes over the main thread and drives both event processing and overlay
//! rendering through the GLib main loop.

#[cfg(feature = "visualizer-gtk")]
pub mod gtk;
