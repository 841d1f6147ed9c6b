//! Resource cleanup lists.
//!
//! A [`Janitor`] collects release actions (signal subscriptions, scheduled
//! work, caller-supplied resources) for an owner and runs each of them exactly
//! once when the owner is torn down. Actions run in reverse registration
//! order, the same order destructors would run in.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::logging::targets;
use crate::signal::Subscription;

/// Identifies one action registered with a [`Janitor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CleanupId(u64);

type Task = Box<dyn FnOnce() + Send + 'static>;

/// A list of release actions that run exactly once.
///
/// Once [`clean`](Self::clean) has run, the janitor stays "cleaned": any
/// action added afterwards runs immediately instead of being stored, so a
/// resource handed to a torn-down owner is never leaked.
#[derive(Default)]
pub struct Janitor {
    tasks: Vec<(CleanupId, Task)>,
    next_id: u64,
    cleaned: bool,
}

impl Janitor {
    /// Create an empty janitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a release action.
    pub fn add<F>(&mut self, task: F) -> CleanupId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = CleanupId(self.next_id);
        self.next_id += 1;

        if self.cleaned {
            tracing::trace!(target: targets::JANITOR, ?id, "janitor already cleaned, running task now");
            run_task(id, Box::new(task));
        } else {
            self.tasks.push((id, Box::new(task)));
        }
        id
    }

    /// Register a signal subscription to be cancelled on cleanup.
    pub fn add_subscription(&mut self, subscription: Subscription) -> CleanupId {
        self.add(subscription.into_cleanup())
    }

    /// Run a single action now and forget it.
    ///
    /// Returns `false` if the action was already run or never registered.
    pub fn release(&mut self, id: CleanupId) -> bool {
        match self.tasks.iter().position(|(task_id, _)| *task_id == id) {
            Some(index) => {
                let (id, task) = self.tasks.remove(index);
                run_task(id, task);
                true
            }
            None => false,
        }
    }

    /// Forget an action without running it.
    pub fn forget(&mut self, id: CleanupId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(task_id, _)| *task_id != id);
        self.tasks.len() != before
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether there are no pending actions.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether [`clean`](Self::clean) has already run.
    pub fn is_cleaned(&self) -> bool {
        self.cleaned
    }

    /// Run every pending action in reverse registration order.
    ///
    /// Returns the number of actions that ran. A panicking action is logged
    /// and does not stop the others.
    pub fn clean(&mut self) -> usize {
        self.cleaned = true;
        let tasks = std::mem::take(&mut self.tasks);
        let count = tasks.len();
        for (id, task) in tasks.into_iter().rev() {
            run_task(id, task);
        }
        if count > 0 {
            tracing::trace!(target: targets::JANITOR, count, "janitor cleaned");
        }
        count
    }
}

fn run_task(id: CleanupId, task: Task) {
    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
        tracing::error!(target: targets::JANITOR, ?id, "cleanup task panicked");
    }
}

impl fmt::Debug for Janitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Janitor")
            .field("pending", &self.tasks.len())
            .field("cleaned", &self.cleaned)
            .finish()
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.clean();
    }
}

static_assertions::assert_impl_all!(Janitor: Send);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Signal;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Box<dyn FnOnce() + Send>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |n: u32| {
            let log = log_clone.clone();
            Box::new(move || log.lock().push(n)) as Box<dyn FnOnce() + Send>
        };
        (log, make)
    }

    #[test]
    fn test_clean_runs_in_reverse_order_once() {
        let (log, make) = recorder();
        let mut janitor = Janitor::new();
        janitor.add(make(1));
        janitor.add(make(2));
        janitor.add(make(3));

        assert_eq!(janitor.clean(), 3);
        assert_eq!(janitor.clean(), 0);
        drop(janitor);

        assert_eq!(*log.lock(), vec![3, 2, 1]);
    }

    #[test]
    fn test_add_after_clean_runs_immediately() {
        let (log, make) = recorder();
        let mut janitor = Janitor::new();
        janitor.clean();
        janitor.add(make(7));
        assert_eq!(*log.lock(), vec![7]);
        assert!(janitor.is_empty());
    }

    #[test]
    fn test_release_and_forget() {
        let (log, make) = recorder();
        let mut janitor = Janitor::new();
        let first = janitor.add(make(1));
        let second = janitor.add(make(2));

        assert!(janitor.release(first));
        assert!(!janitor.release(first));
        assert!(janitor.forget(second));
        janitor.clean();

        assert_eq!(*log.lock(), vec![1]);
    }

    #[test]
    fn test_drop_cleans() {
        let (log, make) = recorder();
        {
            let mut janitor = Janitor::new();
            janitor.add(make(5));
        }
        assert_eq!(*log.lock(), vec![5]);
    }

    #[test]
    fn test_panicking_task_does_not_stop_others() {
        let (log, make) = recorder();
        let mut janitor = Janitor::new();
        janitor.add(make(1));
        janitor.add(|| panic!("bad cleanup"));
        janitor.add(make(3));
        janitor.clean();
        assert_eq!(*log.lock(), vec![3, 1]);
    }

    #[test]
    fn test_subscription_released() {
        let signal = Arc::new(Signal::<()>::new());
        let mut janitor = Janitor::new();
        janitor.add_subscription(signal.subscribe(|_| {}));
        assert_eq!(signal.connection_count(), 1);
        janitor.clean();
        assert_eq!(signal.connection_count(), 0);
    }
}
