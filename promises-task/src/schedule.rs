use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A unit of deferred work: one handler invocation.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// An error that occurred while submitting a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The queue behind the scheduler has been dropped.
    #[error("task queue has shut down")]
    Shutdown,
}

impl ScheduleError {
    /// Check whether this error is the `Shutdown` error.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, ScheduleError::Shutdown)
    }
}

/// Accepts jobs for later execution.
///
/// Implementations must run accepted jobs strictly after `schedule` returns,
/// one at a time, in the order they were accepted.
pub trait Schedule: Send + Sync {
    /// Enqueues `job`.
    fn schedule(&self, job: Job) -> Result<(), ScheduleError>;
}

impl<F> Schedule for F
where
    F: Fn(Job) -> Result<(), ScheduleError> + Send + Sync,
{
    fn schedule(&self, job: Job) -> Result<(), ScheduleError> {
        (self)(job)
    }
}

/// A clonable, type-erased [`Schedule`] handle.
///
/// Every promise carries one, and every promise derived from it inherits the
/// same handle.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<dyn Schedule>,
}

impl Scheduler {
    /// Wraps a custom [`Schedule`] implementation.
    pub fn new<S>(schedule: S) -> Scheduler
    where
        S: Schedule + 'static,
    {
        Scheduler { inner: Arc::new(schedule) }
    }

    /// Submits `job` to the underlying queue.
    pub fn schedule(&self, job: Job) -> Result<(), ScheduleError> {
        self.inner.schedule(job)
    }

    /// Returns `true` if both handles submit to the same queue.
    pub fn same_queue(&self, other: &Scheduler) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.inner) as *const u8,
            Arc::as_ptr(&other.inner) as *const u8,
        )
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler").finish_non_exhaustive()
    }
}
