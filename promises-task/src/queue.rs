use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll, Wake, Waker};
use std::thread::{self, Thread};

use tracing::{debug_span, trace, Span};

use crate::enter::{enter, EnterError};
use crate::schedule::{Job, Schedule, ScheduleError, Scheduler};

/// A single-threaded FIFO queue of deferred jobs.
///
/// Jobs are submitted through the [`Scheduler`] handle returned by
/// [`scheduler()`](TaskQueue::scheduler), which may be cloned and sent to
/// other threads. They are only ever executed by the thread that calls one of
/// the `run` methods, one at a time, in submission order across every chain
/// of promises sharing this queue.
///
/// The scheduler handle does not keep the queue alive: once the `TaskQueue`
/// is dropped, pending jobs are dropped with it and further submissions fail
/// with [`ScheduleError::Shutdown`].
pub struct TaskQueue {
    shared: Arc<Shared>,
    scheduler: Scheduler,
    name: Option<String>,
}

struct Shared {
    jobs: Mutex<VecDeque<Job>>,
    // Set while `run_until` is parked waiting for work.
    runner: Mutex<Option<Waker>>,
}

struct Handle {
    shared: Weak<Shared>,
}

/// Configuration for a [`TaskQueue`].
///
/// ```
/// use promises_task::TaskQueue;
///
/// let queue = TaskQueue::builder().name("ui").capacity(64).build();
/// assert!(queue.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    name: Option<String>,
    capacity: usize,
}

impl Builder {
    /// Creates a builder with no name and no preallocation.
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Names the queue. The name is recorded on the span of every run.
    pub fn name(mut self, name: impl Into<String>) -> Builder {
        self.name = Some(name.into());
        self
    }

    /// Preallocates room for `capacity` queued jobs.
    pub fn capacity(mut self, capacity: usize) -> Builder {
        self.capacity = capacity;
        self
    }

    /// Creates the queue.
    pub fn build(self) -> TaskQueue {
        let shared = Arc::new(Shared {
            jobs: Mutex::new(VecDeque::with_capacity(self.capacity)),
            runner: Mutex::new(None),
        });
        let scheduler = Scheduler::new(Handle { shared: Arc::downgrade(&shared) });
        TaskQueue { shared, scheduler, name: self.name }
    }
}

impl TaskQueue {
    /// Creates an empty, unnamed queue.
    pub fn new() -> TaskQueue {
        Builder::new().build()
    }

    /// Returns a [`Builder`] for a configured queue.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Returns the handle used to submit jobs to this queue.
    pub fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }

    /// Number of jobs waiting to run.
    pub fn len(&self) -> usize {
        lock(&self.shared.jobs).len()
    }

    /// Returns `true` if no job is waiting to run.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the oldest queued job, if any.
    ///
    /// Returns `Ok(false)` when the queue was empty.
    pub fn try_run_one(&mut self) -> Result<bool, EnterError> {
        let _enter = enter()?;
        let span = self.span();
        let _span = span.enter();
        Ok(self.run_next())
    }

    /// Runs queued jobs until the queue is empty, including jobs submitted by
    /// the jobs being run.
    ///
    /// Returns the number of jobs run.
    pub fn run_until_stalled(&mut self) -> Result<usize, EnterError> {
        let _enter = enter()?;
        let span = self.span();
        let _span = span.enter();
        Ok(self.run_queued())
    }

    /// Drives `future` to completion, running queued jobs whenever it is not
    /// ready.
    ///
    /// When neither the future nor the queue can make progress the thread is
    /// parked until the future's waker fires or a new job is submitted, so
    /// other threads may settle the promises `future` waits on. Jobs still
    /// queued when `future` completes stay queued.
    pub fn run_until<F>(&mut self, future: F) -> Result<F::Output, EnterError>
    where
        F: Future,
    {
        let _enter = enter()?;
        let span = self.span();
        let _span = span.enter();

        let notify = Arc::new(Notify { thread: thread::current(), unparked: AtomicBool::new(false) });
        let waker = Waker::from(notify.clone());
        let _runner = RunnerGuard::install(self.shared.clone(), waker.clone());
        let mut cx = Context::from_waker(&waker);

        let mut future = Box::pin(future);
        loop {
            if let Poll::Ready(output) = Pin::as_mut(&mut future).poll(&mut cx) {
                return Ok(output);
            }
            if self.run_queued() > 0 {
                continue;
            }
            // Consume a wakeup that arrived while polling, if any. Otherwise
            // the token left by a racing `unpark()` makes `park()` a no-op.
            if !notify.unparked.swap(false, Ordering::Acquire) {
                trace!("task queue parked");
                thread::park();
                notify.unparked.store(false, Ordering::Release);
            }
        }
    }

    fn run_next(&mut self) -> bool {
        // The lock is released before the job runs so it can enqueue more work.
        let job = lock(&self.shared.jobs).pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    fn run_queued(&mut self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "task queue stalled");
        }
        ran
    }

    fn span(&self) -> Span {
        match &self.name {
            Some(name) => debug_span!("task_queue", name = %name),
            None => debug_span!("task_queue"),
        }
    }
}

impl Default for TaskQueue {
    fn default() -> TaskQueue {
        TaskQueue::new()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}

impl Schedule for Handle {
    fn schedule(&self, job: Job) -> Result<(), ScheduleError> {
        let shared = self.shared.upgrade().ok_or(ScheduleError::Shutdown)?;
        lock(&shared.jobs).push_back(job);
        if let Some(runner) = lock(&shared.runner).as_ref() {
            runner.wake_by_ref();
        }
        Ok(())
    }
}

struct Notify {
    thread: Thread,
    // Remembers a wakeup until the next `park()`, in case code run by the
    // queue uses park/unpark on this thread for its own purposes.
    unparked: AtomicBool,
}

impl Wake for Notify {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        if !self.unparked.swap(true, Ordering::Release) {
            self.thread.unpark();
        }
    }
}

struct RunnerGuard {
    shared: Arc<Shared>,
}

impl RunnerGuard {
    fn install(shared: Arc<Shared>, waker: Waker) -> RunnerGuard {
        *lock(&shared.runner) = Some(waker);
        RunnerGuard { shared }
    }
}

impl Drop for RunnerGuard {
    fn drop(&mut self) {
        *lock(&self.shared.runner) = None;
    }
}

// Jobs never run while a lock is held, so a poisoned lock still guards
// consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
