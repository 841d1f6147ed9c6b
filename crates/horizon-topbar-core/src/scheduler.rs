//! Delayed task scheduling.
//!
//! Icons never block while waiting: timed behavior such as debounce is
//! expressed as "run this closure after a duration" through the [`Scheduler`]
//! trait, which the host environment implements on top of its own event loop.
//!
//! [`ManualScheduler`] is a ready-made implementation driven by an explicit
//! virtual clock. Hosts with a frame loop call [`ManualScheduler::advance`]
//! once per frame with the frame delta; tests call it to step time
//! deterministically.
//!
//! # Example
//!
//! ```
//! use horizon_topbar_core::{ManualScheduler, Scheduler};
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let scheduler = ManualScheduler::new();
//! let fired = Arc::new(AtomicBool::new(false));
//!
//! let fired_clone = fired.clone();
//! scheduler.schedule(Duration::from_secs(2), Box::new(move || {
//!     fired_clone.store(true, Ordering::SeqCst);
//! }));
//!
//! scheduler.advance(Duration::from_secs(1));
//! assert!(!fired.load(Ordering::SeqCst));
//! scheduler.advance(Duration::from_secs(1));
//! assert!(fired.load(Ordering::SeqCst));
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::SchedulerError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a scheduled task.
    pub struct ScheduledTaskId;
}

/// A boxed task closure.
pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a closure after a duration.
///
/// Implementations must not run the task synchronously inside `schedule`,
/// and must not hold internal locks while the task runs: tasks routinely
/// schedule further work.
pub trait Scheduler: Send + Sync {
    /// Run `task` once, no earlier than `delay` from now.
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> ScheduledTaskId;

    /// Cancel a task that has not run yet.
    fn cancel(&self, id: ScheduledTaskId) -> Result<(), SchedulerError>;
}

/// An entry in the scheduler queue (min-heap by run time, FIFO within a tick).
#[derive(Debug, Clone, Copy)]
struct SchedulerQueueEntry {
    id: ScheduledTaskId,
    run_at: Duration,
    sequence: u64,
}

impl PartialEq for SchedulerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.run_at == other.run_at && self.sequence == other.sequence
    }
}

impl Eq for SchedulerQueueEntry {}

impl PartialOrd for SchedulerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchedulerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .run_at
            .cmp(&self.run_at)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

struct SchedulerState {
    /// Virtual time elapsed since the scheduler was created.
    now: Duration,
    /// Pending tasks, removed when they run or are cancelled.
    tasks: SlotMap<ScheduledTaskId, ScheduledTask>,
    /// Priority queue of pending runs.
    queue: BinaryHeap<SchedulerQueueEntry>,
    next_sequence: u64,
}

impl SchedulerState {
    /// Pop the next task due at or before `deadline`, advancing the clock to it.
    fn pop_due(&mut self, deadline: Duration) -> Option<(ScheduledTaskId, ScheduledTask)> {
        while let Some(entry) = self.queue.peek().copied() {
            if entry.run_at > deadline {
                return None;
            }
            self.queue.pop();
            // Cancelled tasks leave stale queue entries behind.
            if let Some(task) = self.tasks.remove(entry.id) {
                self.now = self.now.max(entry.run_at);
                return Some((entry.id, task));
            }
        }
        None
    }
}

/// A scheduler driven by an explicit virtual clock.
pub struct ManualScheduler {
    state: Mutex<SchedulerState>,
}

impl ManualScheduler {
    /// Create a scheduler whose clock starts at zero.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SchedulerState {
                now: Duration::ZERO,
                tasks: SlotMap::with_key(),
                queue: BinaryHeap::new(),
                next_sequence: 0,
            }),
        }
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of tasks waiting to run.
    pub fn pending_count(&self) -> usize {
        self.state.lock().tasks.len()
    }

    /// Time until the next pending task is due, if any.
    pub fn time_until_next(&self) -> Option<Duration> {
        let state = self.state.lock();
        state
            .queue
            .iter()
            .filter(|entry| state.tasks.contains_key(entry.id))
            .map(|entry| entry.run_at.saturating_sub(state.now))
            .min()
    }

    /// Move the clock forward by `elapsed`, running every task that becomes due.
    ///
    /// Tasks run in due-time order; tasks scheduled by a running task that fall
    /// inside the window also run before this call returns. Returns the number
    /// of tasks that ran.
    #[tracing::instrument(skip(self), target = "horizon_topbar_core::scheduler", level = "trace")]
    pub fn advance(&self, elapsed: Duration) -> usize {
        let deadline = self.state.lock().now + elapsed;
        let mut ran = 0;

        loop {
            // The lock is released before the task runs.
            let next = self.state.lock().pop_due(deadline);
            let Some((id, task)) = next else {
                break;
            };
            tracing::trace!(target: targets::SCHEDULER, ?id, "running scheduled task");
            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                tracing::error!(target: targets::SCHEDULER, ?id, "scheduled task panicked");
            }
            ran += 1;
        }

        let mut state = self.state.lock();
        state.now = state.now.max(deadline);
        ran
    }

    /// Run every task that is already due without moving the clock.
    pub fn run_pending(&self) -> usize {
        self.advance(Duration::ZERO)
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> ScheduledTaskId {
        let mut state = self.state.lock();
        let run_at = state.now + delay;
        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let id = state.tasks.insert(task);
        state.queue.push(SchedulerQueueEntry {
            id,
            run_at,
            sequence,
        });
        tracing::trace!(target: targets::SCHEDULER, ?id, ?delay, "task scheduled");
        id
    }

    fn cancel(&self, id: ScheduledTaskId) -> Result<(), SchedulerError> {
        self.state
            .lock()
            .tasks
            .remove(id)
            .map(|_| ())
            .ok_or(SchedulerError::InvalidTaskId)
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("pending", &state.tasks.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(ManualScheduler: Send, Sync);
