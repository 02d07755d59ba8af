//! The inactivity deadline for partial input.
//!
//! [`ResetTimer`] models a cancellable, restartable one-shot without any
//! shared timer state: every arm spawns a sleeper thread that posts a
//! [`Event::Deadline`](crate::controller::Event) tagged with the generation
//! it was armed for.  "Cancelling" is simply bumping the controller's
//! generation counter — an expired sleeper whose tag no longer matches is
//! discarded on arrival, so a stale deadline can never act on newer input or
//! on a closed overlay.

use crate::controller::Event;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Generation-keyed one-shot deadline feeding the controller's event queue.
pub struct ResetTimer {
    tx: mpsc::Sender<Event>,
    timeout: Duration,
}

impl ResetTimer {
    /// Create a timer that posts deadlines into `tx` after `timeout`.
    pub fn new(tx: mpsc::Sender<Event>, timeout: Duration) -> Self {
        Self { tx, timeout }
    }

    /// Schedule a deadline for `generation`.
    ///
    /// Restarting means arming again with a newer generation; the previous
    /// sleeper still wakes up but its event no longer matches anything.
    pub fn arm(&self, generation: u64) {
        let tx = self.tx.clone();
        let timeout = self.timeout;
        thread::spawn(move || {
            thread::sleep(timeout);
            // The receiver may be gone during shutdown; nothing to do then.
            let _ = tx.send(Event::Deadline(generation));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armed_timer_posts_its_generation() {
        let (tx, rx) = mpsc::channel();
        let timer = ResetTimer::new(tx, Duration::from_millis(20));
        timer.arm(7);
        let event = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("deadline should arrive");
        assert_eq!(event, Event::Deadline(7));
    }

    #[test]
    fn rearming_posts_both_generations_in_order() {
        let (tx, rx) = mpsc::channel();
        let timer = ResetTimer::new(tx, Duration::from_millis(20));
        timer.arm(1);
        std::thread::sleep(Duration::from_millis(5));
        timer.arm(2);
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        // Both sleepers fire; the consumer drops whichever is stale.
        assert_eq!(first, Event::Deadline(1));
        assert_eq!(second, Event::Deadline(2));
    }
}
