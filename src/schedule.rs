//! Deferred side effects
//!
//! The only deferred work in a pass is bringing the first failing field into
//! view, a short while after it failed so other fields can finish their own
//! layout changes. Scheduling goes through the [`Scheduler`] trait; every task
//! is abortable, and agents abort theirs when they are dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{AbortHandle, Abortable, BoxFuture};
use futures::FutureExt;

/// Something that can be scrolled into view
pub trait ScrollTarget: Send + Sync {
    /// Bring the element into view; must be a no-op once the element is gone
    fn scroll_into_view(&self);
}

/// A deferred task
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks after a delay
pub trait Scheduler {
    /// Run `task` after `delay`, unless cancelled first
    fn schedule(&self, delay: Duration, task: Task) -> ScheduledTask;
}

/// Handle to a scheduled task
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    handle: AbortHandle,
}

impl ScheduledTask {
    /// Prevent the task from running; no effect if it already ran
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

fn abortable(task: Task) -> (Abortable<BoxFuture<'static, ()>>, ScheduledTask) {
    let (handle, registration) = AbortHandle::new_pair();
    let future = async move { task() }.boxed();
    (
        Abortable::new(future, registration),
        ScheduledTask { handle },
    )
}

struct Due {
    at: Duration,
    seq: u64,
    task: Abortable<BoxFuture<'static, ()>>,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    seq: u64,
    queue: Vec<Due>,
}

/// A scheduler driven by hand
///
/// Time only moves in [`ManualScheduler::advance`]. Hosts with their own event
/// loop call it from their tick; tests use it to step through delays.
///
/// # Example
///
/// ```rust
/// use formwatch::schedule::{ManualScheduler, Scheduler};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let scheduler = ManualScheduler::new();
/// let ran = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&ran);
/// scheduler.schedule(
///     Duration::from_millis(200),
///     Box::new(move || flag.store(true, Ordering::SeqCst)),
/// );
///
/// scheduler.advance(Duration::from_millis(199));
/// assert!(!ran.load(Ordering::SeqCst));
/// scheduler.advance(Duration::from_millis(1));
/// assert!(ran.load(Ordering::SeqCst));
/// ```
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualScheduler {
    /// A scheduler at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward and run every task that became due, oldest first
    ///
    /// Returns how many tasks ran; cancelled tasks are discarded silently.
    pub fn advance(&self, by: Duration) -> usize {
        let due = {
            let mut clock = self.clock.borrow_mut();
            clock.now += by;
            let now = clock.now;
            let (mut due, rest): (Vec<_>, Vec<_>) =
                clock.queue.drain(..).partition(|entry| entry.at <= now);
            clock.queue = rest;
            due.sort_by_key(|entry| (entry.at, entry.seq));
            due
        };

        // Tasks may schedule more work, so the clock is not borrowed here.
        due.into_iter()
            .filter_map(|entry| entry.task.now_or_never())
            .filter(Result::is_ok)
            .count()
    }

    /// Tasks waiting, cancelled ones included
    pub fn pending(&self) -> usize {
        self.clock.borrow().queue.len()
    }

    /// Time elapsed since creation
    pub fn now(&self) -> Duration {
        self.clock.borrow().now
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> ScheduledTask {
        let (task, handle) = abortable(task);
        let mut clock = self.clock.borrow_mut();
        let at = clock.now + delay;
        let seq = clock.seq;
        clock.seq += 1;
        clock.queue.push(Due { at, seq, task });
        handle
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}

/// A scheduler spawning onto the current Tokio runtime
///
/// Must be used from within a runtime.
#[cfg(feature = "async")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[cfg(feature = "async")]
impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> ScheduledTask {
        let (handle, registration) = AbortHandle::new_pair();
        let delayed = async move {
            tokio::time::sleep(delay).await;
            task();
        };
        tokio::spawn(Abortable::new(delayed, registration));
        ScheduledTask { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter_task(count: &Arc<AtomicUsize>) -> Task {
        let count = Arc::clone(count);
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_runs_only_when_due() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        scheduler.schedule(Duration::from_millis(200), counter_task(&count));

        assert_eq!(scheduler.advance(Duration::from_millis(100)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(100)), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let task = scheduler.schedule(Duration::from_millis(10), counter_task(&count));

        task.cancel();
        assert_eq!(scheduler.advance(Duration::from_secs(1)), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_runs_in_due_order() {
        let scheduler = ManualScheduler::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        for (delay, tag) in [(30, "late"), (10, "early")] {
            let order = Arc::clone(&order);
            scheduler.schedule(
                Duration::from_millis(delay),
                Box::new(move || order.lock().unwrap().push(tag)),
            );
        }

        scheduler.advance(Duration::from_millis(50));
        assert_eq!(*order.lock().unwrap(), vec!["early", "late"]);
    }
}
