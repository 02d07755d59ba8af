//! IPC listener that accepts commands over a Unix socket.
//!
//! External tools (compositor key bindings, scripts, `socat`) connect to the
//! socket and send newline-delimited JSON commands. This is how the global
//! hotkey reaches the daemon: the user binds a key to write `"Show"` here.

pub mod listener;
