//! Incremental matching of typed characters against the code grid.
//!
//! [`InputMatcher`] is a tiny state machine: `Empty` (no buffered character)
//! or `Partial` (one buffered character). Each accepted key press produces a
//! [`Decision`]; the second letter of a pair always resolves to `Matched` or
//! `Rejected` and drops the machine back to `Empty`.
//!
//! The matcher itself holds no clock. The session arms a one-shot deadline
//! whenever a partial buffer exists and calls [`InputMatcher::expire`] when
//! it fires; see [`crate::timer`].

use crate::command::KeyPress;
use crate::grid::{Code, CodeGrid};

/// Outcome of feeding one event to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Waiting for more input; the buffer may have changed.
    Pending,
    /// A complete code matched a cell of the active grid.
    Matched(Code),
    /// A complete code matched nothing; the buffer has been cleared.
    Rejected,
    /// Escape was pressed; the overlay should close with no action.
    Cancelled,
    /// The inactivity deadline fired on a partial buffer. Callers treat this
    /// exactly like [`Decision::Rejected`].
    TimedOut,
}

/// State machine over classified key presses.
///
/// Case-insensitive: characters are normalized to uppercase before buffering,
/// so `qx` and `QX` resolve to the same code. A lone buffered character is
/// never looked up — single-letter codes do not exist.
#[derive(Debug, Default)]
pub struct InputMatcher {
    buffer: Option<char>,
}

impl InputMatcher {
    /// Create a matcher with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The partial buffer as shown to the user (zero or one characters).
    pub fn buffer(&self) -> String {
        self.buffer.iter().collect()
    }

    /// Whether a character is buffered and a deadline should be pending.
    pub fn is_partial(&self) -> bool {
        self.buffer.is_some()
    }

    /// Feed one key press, matching complete codes against `grid`.
    ///
    /// Returns `None` when the input does not participate in any transition
    /// (non-alphabetic characters, Backspace on an empty buffer): the state
    /// is untouched and any pending deadline keeps running.
    pub fn press(&mut self, key: KeyPress, grid: &CodeGrid) -> Option<Decision> {
        match key {
            KeyPress::Escape => {
                self.buffer = None;
                Some(Decision::Cancelled)
            }
            KeyPress::Backspace => {
                if self.buffer.take().is_some() {
                    Some(Decision::Pending)
                } else {
                    None
                }
            }
            KeyPress::Char(c) if c.is_ascii_alphabetic() => {
                let letter = c.to_ascii_uppercase();
                match self.buffer.take() {
                    None => {
                        self.buffer = Some(letter);
                        Some(Decision::Pending)
                    }
                    Some(first) => match Code::new(first, letter) {
                        Some(code) if grid.contains(code) => Some(Decision::Matched(code)),
                        _ => Some(Decision::Rejected),
                    },
                }
            }
            KeyPress::Char(_) => None,
        }
    }

    /// The inactivity deadline fired: clear the buffer.
    pub fn expire(&mut self) -> Decision {
        self.buffer = None;
        Decision::TimedOut
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;

    fn grid(rows: u16, cols: u16) -> CodeGrid {
        CodeGrid::build(GridSpec {
            rows,
            cols,
            screen_width: 1920,
            screen_height: 1080,
        })
        .unwrap()
    }

    fn full_grid() -> CodeGrid {
        CodeGrid::build(GridSpec {
            rows: 26,
            cols: 26,
            screen_width: 2600,
            screen_height: 2600,
        })
        .unwrap()
    }

    #[test]
    fn two_letters_match_a_known_code() {
        let g = full_grid();
        let mut m = InputMatcher::new();
        assert_eq!(m.press(KeyPress::Char('A'), &g), Some(Decision::Pending));
        assert_eq!(m.buffer(), "A");
        let code = g.code_for(0, 0).unwrap();
        assert_eq!(m.press(KeyPress::Char('A'), &g), Some(Decision::Matched(code)));
        assert_eq!(m.buffer(), "");
        assert!(!m.is_partial());
    }

    #[test]
    fn lowercase_input_is_normalized() {
        let g = full_grid();
        let mut m = InputMatcher::new();
        m.press(KeyPress::Char('q'), &g);
        let decision = m.press(KeyPress::Char('x'), &g);
        let code = Code::new('Q', 'X').unwrap();
        assert_eq!(decision, Some(Decision::Matched(code)));
    }

    #[test]
    fn unknown_code_is_rejected_and_buffer_clears() {
        // 4x4 grid assigns AA..AP; ZZ is absent.
        let g = grid(4, 4);
        let mut m = InputMatcher::new();
        m.press(KeyPress::Char('Z'), &g);
        assert_eq!(m.press(KeyPress::Char('Z'), &g), Some(Decision::Rejected));
        assert_eq!(m.buffer(), "");
        // Fresh input starts a new pending pair.
        assert_eq!(m.press(KeyPress::Char('A'), &g), Some(Decision::Pending));
        assert_eq!(m.buffer(), "A");
    }

    #[test]
    fn non_alphabetic_input_is_ignored() {
        let g = full_grid();
        let mut m = InputMatcher::new();
        m.press(KeyPress::Char('A'), &g);
        assert_eq!(m.press(KeyPress::Char('9'), &g), None);
        assert_eq!(m.buffer(), "A", "buffer must survive ignored input");
        // The next letter still completes the pair.
        let code = g.code_for(0, 1).unwrap();
        assert_eq!(m.press(KeyPress::Char('B'), &g), Some(Decision::Matched(code)));
    }

    #[test]
    fn backspace_drops_the_buffered_character() {
        let g = full_grid();
        let mut m = InputMatcher::new();
        m.press(KeyPress::Char('A'), &g);
        assert_eq!(m.press(KeyPress::Backspace, &g), Some(Decision::Pending));
        assert_eq!(m.buffer(), "");
        assert!(!m.is_partial());
    }

    #[test]
    fn backspace_on_empty_buffer_is_a_no_op() {
        let g = full_grid();
        let mut m = InputMatcher::new();
        assert_eq!(m.press(KeyPress::Backspace, &g), None);
        assert_eq!(m.buffer(), "");
    }

    #[test]
    fn escape_cancels_from_both_states() {
        let g = full_grid();
        let mut m = InputMatcher::new();
        assert_eq!(m.press(KeyPress::Escape, &g), Some(Decision::Cancelled));

        m.press(KeyPress::Char('A'), &g);
        assert_eq!(m.press(KeyPress::Escape, &g), Some(Decision::Cancelled));
        assert_eq!(m.buffer(), "");
    }

    #[test]
    fn expiry_clears_a_partial_buffer() {
        let g = full_grid();
        let mut m = InputMatcher::new();
        m.press(KeyPress::Char('A'), &g);
        assert!(m.is_partial());
        assert_eq!(m.expire(), Decision::TimedOut);
        assert_eq!(m.buffer(), "");
        // Input after expiry starts fresh.
        assert_eq!(m.press(KeyPress::Char('B'), &g), Some(Decision::Pending));
        assert_eq!(m.buffer(), "B");
    }

    #[test]
    fn single_letter_is_never_looked_up() {
        // 1x1 grid contains only AA; pressing A once must stay pending even
        // though "A" is a prefix of the only code.
        let g = grid(1, 1);
        let mut m = InputMatcher::new();
        assert_eq!(m.press(KeyPress::Char('A'), &g), Some(Decision::Pending));
        assert!(m.is_partial());
    }
}
