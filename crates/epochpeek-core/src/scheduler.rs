use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a scheduled callback.
pub trait TimerHandle {
    /// Prevents the callback from running if it has not fired yet.
    fn cancel(&self);
}

/// Runs a callback once after a delay.
pub trait Scheduler: Send + Sync {
    type Handle: TimerHandle + Send + 'static;

    fn schedule(&self, delay: Duration, task: Task) -> Self::Handle;
}

/// Scheduler backed by tokio timers.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Uses the runtime the caller is running on.
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

#[derive(Debug)]
pub struct TokioTimer {
    join: JoinHandle<()>,
}

impl TimerHandle for TokioTimer {
    fn cancel(&self) {
        self.join.abort();
    }
}

impl Scheduler for TokioScheduler {
    type Handle = TokioTimer;

    fn schedule(&self, delay: Duration, task: Task) -> TokioTimer {
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        TokioTimer { join }
    }
}

struct ManualEntry {
    id: u64,
    due: Duration,
    task: Task,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    entries: Vec<ManualEntry>,
}

/// Scheduler driven by an explicit virtual clock.
///
/// Nothing runs until [`ManualScheduler::advance`] moves the clock past a
/// callback's due time.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

pub struct ManualTimer {
    id: u64,
    state: Arc<Mutex<ManualState>>,
}

impl TimerHandle for ManualTimer {
    fn cancel(&self) {
        lock(&self.state).entries.retain(|entry| entry.id != self.id);
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        lock(&self.state).now
    }

    /// Number of callbacks scheduled and not yet run or cancelled.
    pub fn pending(&self) -> usize {
        lock(&self.state).entries.len()
    }

    /// Moves the clock forward and runs every callback that became due, in
    /// due-time order. Callbacks may schedule or cancel further timers.
    pub fn advance(&self, by: Duration) {
        let target = lock(&self.state).now + by;

        loop {
            let next = {
                let mut state = lock(&self.state);
                let due_index = state
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due <= target)
                    .min_by_key(|(_, entry)| (entry.due, entry.id))
                    .map(|(index, _)| index);
                match due_index {
                    Some(index) => {
                        let entry = state.entries.remove(index);
                        state.now = entry.due;
                        Some(entry.task)
                    }
                    None => {
                        state.now = target;
                        None
                    }
                }
            };

            // The lock is released so the callback can touch the scheduler.
            match next {
                Some(task) => task(),
                None => break,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualTimer;

    fn schedule(&self, delay: Duration, task: Task) -> ManualTimer {
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now + delay;
        state.entries.push(ManualEntry { id, due, task });
        ManualTimer {
            id,
            state: Arc::clone(&self.state),
        }
    }
}

fn lock(state: &Mutex<ManualState>) -> MutexGuard<'_, ManualState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
