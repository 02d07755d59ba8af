//! Pointer injection via the XTest extension.
//!
//! XTest lets a process synthesize mouse events as if the user had moved the
//! physical device: `XTestFakeMotionEvent` warps the cursor to absolute pixel
//! coordinates and `XTestFakeButtonEvent` presses or releases a button.  The
//! receiving application cannot distinguish these from real input.
//!
//! The display connection is opened once and held for the lifetime of the
//! sink; every injection is flushed immediately so the click lands before
//! the overlay window disappears.

use crate::traits::PointerSink;
use log::debug;
use x11::{xlib, xtest};

/// Passing `CurrentTime` (0) to XTest functions means "use the server's
/// current timestamp", the correct value for synthesized events.
const CURRENT_TIME: xlib::Time = 0;

/// Passing `-1` as the screen number to `XTestFakeMotionEvent` means "the
/// screen that currently contains the pointer".
const SCREEN_DEFAULT: i32 = -1;

/// X11 button number for the left (primary) mouse button.
const BUTTON_LEFT: u32 = 1;

/// Errors from the X11 backends.
#[derive(Debug, thiserror::Error)]
pub enum X11Error {
    /// The X display could not be opened.
    #[error("cannot open X display (DISPLAY={0})")]
    DisplayUnavailable(String),

    /// The server does not support the XTest extension.
    #[error("XTest extension not available on this display")]
    XTestMissing,
}

fn display_env() -> String {
    std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".into())
}

/// A [`PointerSink`] that injects motion and clicks through XTest.
pub struct X11Pointer {
    display: *mut xlib::Display,
}

impl X11Pointer {
    /// Connect to the display named by `DISPLAY` and verify XTest support.
    pub fn new() -> Result<Self, X11Error> {
        // SAFETY: XOpenDisplay accepts a null pointer, meaning "use $DISPLAY".
        // The returned connection is closed in Drop.
        let display = unsafe { xlib::XOpenDisplay(std::ptr::null()) };
        if display.is_null() {
            return Err(X11Error::DisplayUnavailable(display_env()));
        }

        let (mut event_base, mut error_base, mut major, mut minor) = (0, 0, 0, 0);
        // SAFETY: `display` is a valid connection; the out-params are plain ints.
        let supported = unsafe {
            xtest::XTestQueryExtension(
                display,
                &mut event_base,
                &mut error_base,
                &mut major,
                &mut minor,
            )
        };
        if supported == xlib::False {
            // SAFETY: opened above, not used past this point.
            unsafe { xlib::XCloseDisplay(display) };
            return Err(X11Error::XTestMissing);
        }
        debug!("XTest {}.{} available", major, minor);
        Ok(Self { display })
    }
}

impl Drop for X11Pointer {
    fn drop(&mut self) {
        // SAFETY: `display` was opened in `new` and is not used after this.
        unsafe { xlib::XCloseDisplay(self.display) };
    }
}

impl PointerSink for X11Pointer {
    type Error = X11Error;

    fn move_to(&self, x: i32, y: i32) -> Result<(), X11Error> {
        debug!("XTest motion to ({}, {})", x, y);
        // SAFETY: `display` stays valid for the lifetime of self.
        unsafe {
            xtest::XTestFakeMotionEvent(self.display, SCREEN_DEFAULT, x, y, CURRENT_TIME);
            xlib::XFlush(self.display);
        }
        Ok(())
    }

    fn click(&self, x: i32, y: i32) -> Result<(), X11Error> {
        debug!("XTest left click at ({}, {})", x, y);
        // SAFETY: as above; press and release are separate fake events.
        unsafe {
            xtest::XTestFakeButtonEvent(self.display, BUTTON_LEFT, xlib::True, CURRENT_TIME);
            xtest::XTestFakeButtonEvent(self.display, BUTTON_LEFT, xlib::False, CURRENT_TIME);
            xlib::XFlush(self.display);
        }
        Ok(())
    }
}
