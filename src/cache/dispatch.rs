//! Callback Dispatch Module
//!
//! Runs eviction/expiry callbacks off the caller's stack and schedules
//! per-entry expiry timers. Inside a tokio runtime callbacks go to the
//! blocking pool and timers are tokio tasks. Outside one, callbacks get a
//! plain OS thread and every timer shares a single scheduler thread, so the
//! engine also works from synchronous code.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Instant;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{trace, warn};

type Job = Box<dyn FnOnce() + Send>;

/// Stale heap slots tolerated before cancelled timers are compacted away.
const COMPACT_SLACK: usize = 64;

// == Spawn Callback ==
/// Runs `f` on another thread. The callback may re-enter the cache even
/// when dispatched while the cache lock is held.
pub(crate) fn spawn_callback<F>(f: F)
where
    F: FnOnce() + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(f);
        }
        Err(_) => {
            thread::spawn(f);
        }
    }
}

// == Scheduler ==
/// Deadline heap served by one thread. Cancelled jobs are dropped at once;
/// their heap slots are skipped when popped or compacted when they pile up.
pub(crate) struct Scheduler {
    state: Mutex<Schedule>,
    wake: Condvar,
}

#[derive(Default)]
struct Schedule {
    queue: BinaryHeap<Reverse<(Instant, u64)>>,
    jobs: HashMap<u64, Job>,
    next_id: u64,
}

impl Scheduler {
    fn new() -> Self {
        Self {
            state: Mutex::new(Schedule::default()),
            wake: Condvar::new(),
        }
    }

    /// Creates a scheduler and starts its thread.
    pub(crate) fn start() -> Arc<Self> {
        let scheduler = Arc::new(Self::new());
        let worker = scheduler.clone();
        if let Err(err) = thread::Builder::new()
            .name("auth-cache-timer".to_string())
            .spawn(move || worker.run())
        {
            warn!(error = %err, "Failed to start expiry timer thread");
        }
        scheduler
    }

    /// Process-wide scheduler used by timers created outside a runtime.
    fn global() -> &'static Arc<Scheduler> {
        static GLOBAL: OnceLock<Arc<Scheduler>> = OnceLock::new();
        GLOBAL.get_or_init(Scheduler::start)
    }

    pub(crate) fn schedule(&self, deadline: Instant, job: Job) -> u64 {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;

        let is_next = state
            .queue
            .peek()
            .map_or(true, |Reverse((head, _))| deadline < *head);
        state.queue.push(Reverse((deadline, id)));
        state.jobs.insert(id, job);

        if is_next {
            self.wake.notify_one();
        }
        id
    }

    pub(crate) fn cancel(&self, id: u64) {
        let mut state = self.state.lock();
        if state.jobs.remove(&id).is_none() {
            return;
        }

        if state.queue.len() > COMPACT_SLACK + 2 * state.jobs.len() {
            let Schedule { queue, jobs, .. } = &mut *state;
            queue.retain(|Reverse((_, id))| jobs.contains_key(id));
        }
    }

    #[cfg(test)]
    /// Jobs still waiting to fire.
    pub(crate) fn pending(&self) -> usize {
        self.state.lock().jobs.len()
    }

    #[cfg(test)]
    /// Heap slots held, stale ones included.
    pub(crate) fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }

    fn run(&self) {
        let mut state = self.state.lock();
        loop {
            let head = state.queue.peek().map(|Reverse(slot)| *slot);
            match head {
                None => self.wake.wait(&mut state),
                Some((deadline, id)) if deadline <= Instant::now() => {
                    state.queue.pop();
                    if let Some(job) = state.jobs.remove(&id) {
                        MutexGuard::unlocked(&mut state, || spawn_callback(job));
                    }
                }
                Some((deadline, _)) => {
                    self.wake.wait_until(&mut state, deadline);
                }
            }
        }
    }
}

// == Timer ==
/// Handle to a scheduled expiry callback. Dropping it does not cancel.
#[derive(Debug)]
pub(crate) struct Timer {
    cancelled: Arc<AtomicBool>,
    task: Option<AbortHandle>,
    job: Option<u64>,
}

impl Timer {
    // == Schedule ==
    /// Runs `f` once at `deadline` unless cancelled first.
    pub(crate) fn schedule<F>(deadline: Instant, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        trace!(
            delay_ms = deadline.saturating_duration_since(Instant::now()).as_millis() as u64,
            "Scheduling expiry timer"
        );

        match Handle::try_current() {
            Ok(handle) => {
                let flag = cancelled.clone();
                let join = handle.spawn(async move {
                    tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
                    if !flag.load(Ordering::Acquire) {
                        spawn_callback(f);
                    }
                });
                Self {
                    cancelled,
                    task: Some(join.abort_handle()),
                    job: None,
                }
            }
            Err(_) => {
                let job = Scheduler::global().schedule(deadline, Box::new(f));
                Self {
                    cancelled,
                    task: None,
                    job: Some(job),
                }
            }
        }
    }

    // == Stop ==
    /// Cancels the timer. Has no effect once the callback started.
    pub(crate) fn stop(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(task) = &self.task {
            task.abort();
        }
        if let Some(job) = self.job {
            Scheduler::global().cancel(job);
        }
    }
}

#[cfg(test)]
pub(crate) fn global_pending_timers() -> usize {
    Scheduler::global().pending()
}
