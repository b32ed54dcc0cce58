use std::{collections::BTreeMap, time::Duration};

/// Handle of a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Deferred work the engine asks its scheduler to run later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Task {
    /// Advance the running animation cycle by one sub-step.
    Sequencer,
    /// Re-enable transitions after a reset.
    RestoreTransitions,
    /// Retry drawing connectors.
    Redraw {
        /// Retry number, starting at 1.
        attempt: u32,
    },
    /// Retry initialization.
    Initialize {
        /// Retry number, starting at 1.
        attempt: u32,
    },
    /// Resize debounce elapsed.
    ResizeSettled,
    /// Zoom scale has been applied long enough to re-measure.
    ZoomSettled,
}

/// Timer source used by the engine.
///
/// Every suspension point of the engine is a timer. A browser host implements this on top of
/// `setTimeout` and forwards each expiry to [`crate::PipelineDiagram::fire`]; tests use
/// [`TimerQueue`] and fast-forward virtual time.
pub trait Scheduler {
    /// Current time since the scheduler's epoch.
    fn now(&self) -> Duration;

    /// Run `task` once `delay` has elapsed.
    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId;

    /// Cancel a pending timer. Returns `false` if it already fired or never existed.
    fn cancel(&mut self, id: TimerId) -> bool;
}

/// Deterministic virtual-time timer queue.
///
/// Timers with equal deadlines fire in the order they were scheduled.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, u64), Task>,
}

impl TimerQueue {
    /// Empty queue at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of pending timers carrying `task`.
    pub fn pending_of(&self, task: Task) -> usize {
        self.pending.values().filter(|t| **t == task).count()
    }

    /// Pending tasks in firing order.
    pub fn pending_tasks(&self) -> impl Iterator<Item = Task> + '_ {
        self.pending.values().copied()
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest timer due at or before `deadline`, moving the clock to its due time.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(TimerId, Task)> {
        let (&(due, seq), _) = self.pending.first_key_value()?;
        if due > deadline {
            return None;
        }
        let task = self.pending.remove(&(due, seq))?;
        self.now = self.now.max(due);
        Some((TimerId(seq), task))
    }

    /// Move the clock forward without firing anything.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

impl Scheduler for TimerQueue {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        self.pending.insert((due, id), task);
        TimerId(id)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let key = self
            .pending
            .keys()
            .find(|(_, seq)| *seq == id.0)
            .copied();
        match key {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/time/scheduler.rs"]
mod tests;
