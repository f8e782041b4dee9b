use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;

/// What a delayed UI transition does once its delay is over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerAction {
    ClearMessage,
    ShowRegistration,
    Navigate(String),
}

/// Sent by a timer task when its delay elapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFired {
    pub generation: u64,
    pub action: TimerAction,
}

#[derive(Debug)]
struct PendingTimer {
    handle: AbortHandle,
    deadline: Instant,
}

/// Delayed UI transitions tied to the state they were scheduled in.
///
/// Each timer is a tokio task that sleeps and then reports on a channel.
/// [`Scheduler::cancel_all`] aborts every pending task and bumps the
/// generation, so a report that slipped through is recognised as stale.
#[derive(Debug)]
pub struct Scheduler {
    tx: UnboundedSender<TimerFired>,
    generation: u64,
    pending: Vec<PendingTimer>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<TimerFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                generation: 0,
                pending: Vec::new(),
            },
            rx,
        )
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Must be called from within a tokio runtime
    pub fn schedule(&mut self, delay: Duration, action: TimerAction) {
        self.pending.retain(|timer| !timer.handle.is_finished());

        let deadline = Instant::now() + delay;
        let fired = TimerFired {
            generation: self.generation,
            action,
        };
        debug!("Scheduling {:?} in {}ms", fired.action, delay.as_millis());

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // The receiver is gone when the page surface shut down
            let _ = tx.send(fired);
        })
        .abort_handle();

        self.pending.push(PendingTimer { handle, deadline });
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            debug!("Cancelling {} pending timer(s)", self.pending.len());
        }
        for timer in self.pending.drain(..) {
            timer.handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    #[must_use]
    pub fn is_current(&self, fired: &TimerFired) -> bool {
        fired.generation == self.generation
    }

    /// Earliest deadline among the timers still running
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .iter()
            .filter(|timer| !timer.handle.is_finished())
            .map(|timer| timer.deadline)
            .min()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for timer in &self.pending {
            timer.handle.abort();
        }
    }
}
