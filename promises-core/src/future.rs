use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::Reason;
use crate::promise::Promise;

/// Awaiting a promise yields its outcome once it settles.
///
/// Polling does not run handlers; whatever drives the promise's
/// [`Scheduler`](promises_task::Scheduler) still has to run its queue.
///
/// ```
/// use promises_core::Promise;
/// use promises_task::TaskQueue;
///
/// let mut queue = TaskQueue::new();
/// let p = Promise::new(&queue.scheduler());
/// let doubled = p.then(|v: u32| Ok(v * 2));
/// p.resolve(21);
///
/// assert_eq!(queue.run_until(doubled).unwrap().unwrap(), 42);
/// ```
impl<T> Future for Promise<T>
where
    T: Clone + Send + 'static,
{
    type Output = Result<T, Reason>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.register_waker(cx.waker()) {
            Some(result) => Poll::Ready(result),
            None => Poll::Pending,
        }
    }
}
