//! One visible lifetime of the overlay.
//!
//! An [`OverlaySession`] pairs a [`CodeGrid`] with an [`InputMatcher`] and
//! turns matcher decisions into [`SessionAction`]s for the controller: stay
//! open, dispatch a pointer move+click, or close with no action.  The session
//! holds no channel, timer, or backend handle — it is a deterministic state
//! holder, which keeps it unit-testable without any event plumbing.

use crate::command::KeyPress;
use crate::grid::{CodeGrid, GridError, GridSpec};
use crate::matcher::{Decision, InputMatcher};
use crate::traits::{CellLabel, OverlayView, ScreenRect};
use log::{debug, error};

/// What the controller should do after feeding an event to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Nothing changed (ignored input). Leave the deadline alone.
    Continue,
    /// The buffer changed; republish it and re-arm or drop the deadline.
    Refresh,
    /// Move the cursor to `(x, y)`, click, then close the session.
    MoveAndClick {
        /// Click target X (cell center).
        x: i32,
        /// Click target Y (cell center plus the configured offset).
        y: i32,
    },
    /// Close the session with no pointer action.
    Close,
}

/// State for one overlay lifetime: grid, matcher, and click placement.
pub struct OverlaySession {
    grid: CodeGrid,
    matcher: InputMatcher,
    click_offset_y: i32,
}

impl OverlaySession {
    /// Build a session for the given grid spec.
    ///
    /// Fails with [`GridError::InvalidSpec`] for unusable dimensions; the
    /// caller must not show an overlay in that case.
    pub fn new(spec: GridSpec, click_offset_y: i32) -> Result<Self, GridError> {
        Ok(Self {
            grid: CodeGrid::build(spec)?,
            matcher: InputMatcher::new(),
            click_offset_y,
        })
    }

    /// The session's code grid.
    pub fn grid(&self) -> &CodeGrid {
        &self.grid
    }

    /// The current partial buffer (for display feedback).
    pub fn buffer(&self) -> String {
        self.matcher.buffer()
    }

    /// Whether a first letter is buffered and the deadline should run.
    pub fn awaiting_second_letter(&self) -> bool {
        self.matcher.is_partial()
    }

    /// Snapshot everything the renderer needs to draw this session.
    pub fn view(&self) -> OverlayView {
        let spec = self.grid.spec();
        OverlayView {
            screen: ScreenRect {
                width: spec.screen_width,
                height: spec.screen_height,
            },
            cell_width: self.grid.cell_width(),
            cell_height: self.grid.cell_height(),
            labels: self
                .grid
                .codes()
                .map(|(code, cell)| CellLabel {
                    code,
                    x: cell.center_x,
                    y: cell.center_y,
                })
                .collect(),
            buffer: self.matcher.buffer(),
        }
    }

    /// Feed one key press through the matcher.
    pub fn handle_key(&mut self, key: KeyPress) -> SessionAction {
        let Some(decision) = self.matcher.press(key, &self.grid) else {
            return SessionAction::Continue;
        };
        match decision {
            Decision::Pending | Decision::Rejected | Decision::TimedOut => SessionAction::Refresh,
            Decision::Cancelled => SessionAction::Close,
            Decision::Matched(code) => match self.grid.cell_for(code) {
                Ok(cell) => {
                    debug!("matched {} -> cell ({}, {})", code, cell.row, cell.col);
                    SessionAction::MoveAndClick {
                        x: cell.center_x,
                        y: cell.center_y + self.click_offset_y,
                    }
                }
                // The matcher only emits codes it found in the grid, so this
                // is an internal-invariant violation: never move the cursor
                // on it, just tear the session down.
                Err(e) => {
                    error!("matched code has no cell ({}), closing overlay", e);
                    SessionAction::Close
                }
            },
        }
    }

    /// The inactivity deadline fired: clear the buffer, stay open.
    pub fn handle_deadline(&mut self) -> SessionAction {
        self.matcher.expire();
        SessionAction::Refresh
    }
}

//  Tests
