use std::cell::Cell;
use std::fmt;

use thiserror::Error;

thread_local! {
    // `true` while this thread is draining a task queue.
    static RUNNING: Cell<bool> = Cell::new(false);
}

/// Proof that the current thread is running queued jobs.
///
/// Held by every [`TaskQueue`](crate::TaskQueue) run for its whole duration;
/// the thread may start another run once it is dropped.
pub struct Enter {
    _not_send: std::marker::PhantomData<*const ()>,
}

/// A queue run was started from a job of another run on the same thread.
///
/// Handlers must run one after another, each to completion, so a handler
/// cannot drain a queue itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot run a task queue from within another task queue run")]
pub struct EnterError {
    _priv: (),
}

/// Claims the current thread for a queue run.
///
/// ```
/// use promises_task::enter;
///
/// let run = enter().unwrap();
/// assert!(enter().is_err());
/// drop(run);
/// assert!(enter().is_ok());
/// ```
///
/// # Errors
///
/// Fails if a run is already in progress on this thread.
pub fn enter() -> Result<Enter, EnterError> {
    if RUNNING.with(|running| running.replace(true)) {
        return Err(EnterError { _priv: () });
    }
    Ok(Enter { _not_send: std::marker::PhantomData })
}

impl fmt::Debug for Enter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enter").finish_non_exhaustive()
    }
}

impl Drop for Enter {
    fn drop(&mut self) {
        let was_running = RUNNING.with(|running| running.replace(false));
        debug_assert!(was_running);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn claim_is_per_thread() {
        let _run = enter().unwrap();
        thread::spawn(|| assert!(enter().is_ok())).join().unwrap();
        assert!(enter().is_err());
    }

    #[test]
    fn released_after_panicking_run() {
        let result = std::panic::catch_unwind(|| {
            let _run = enter().unwrap();
            panic!("job failed");
        });
        assert!(result.is_err());
        assert!(enter().is_ok());
    }
}
