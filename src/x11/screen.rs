//! Screen geometry via the plain Xlib screen API.
//!
//! Uses `XDisplayWidth`/`XDisplayHeight` on the default screen, which is
//! always available without Xrandr.  Multi-output layouts attached to a
//! single X screen therefore report the combined rectangle; per-output
//! geometry would need Xrandr.

use crate::traits::{ScreenRect, ScreenSource};
use x11::xlib;

use super::pointer::X11Error;

/// A [`ScreenSource`] that queries the default X screen.
///
/// The connection is opened per query, so a resolution change between two
/// overlay sessions is picked up on the next show.
#[derive(Debug, Default)]
pub struct X11Screen;

impl X11Screen {
    /// Create a screen source. No connection is made until the first query.
    pub fn new() -> Self {
        Self
    }
}

impl ScreenSource for X11Screen {
    type Error = X11Error;

    fn primary_screen(&self) -> Result<ScreenRect, X11Error> {
        // SAFETY: XOpenDisplay(null) connects to $DISPLAY; closed below.
        let display = unsafe { xlib::XOpenDisplay(std::ptr::null()) };
        if display.is_null() {
            let env = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".into());
            return Err(X11Error::DisplayUnavailable(env));
        }

        // SAFETY: `display` is a valid non-null connection.
        let rect = unsafe {
            let screen = xlib::XDefaultScreen(display);
            ScreenRect {
                width: xlib::XDisplayWidth(display, screen) as u32,
                height: xlib::XDisplayHeight(display, screen) as u32,
            }
        };

        // SAFETY: opened above, not used past this point.
        unsafe { xlib::XCloseDisplay(display) };
        Ok(rect)
    }
}
