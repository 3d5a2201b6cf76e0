//! The settlement engine behind the `promises` library.
//!
//! A [`Promise`] is a deferred value: producers settle it once, with a value
//! or a [`Reason`], and consumers attach handlers that run after it settles.
//! Handlers run as jobs on a [`Scheduler`], so no handler ever runs inside the
//! call that registers it or settles its promise, and handlers on the same
//! queue run one at a time in the order they became runnable.
//!
//! A handler's return value goes through the resolution procedure: a plain
//! value fulfills the handler's promise, another [`Promise`] is adopted, and
//! a foreign [`Thenable`] is subscribed to.

#![warn(missing_docs)]
#![doc(test(attr(deny(warnings), allow(dead_code, unused_assignments, unused_variables))))]

mod error;
pub use crate::error::{PromiseError, Reason};

mod future;

mod promise;
pub use crate::promise::{Promise, Resolver};

mod relay;

mod resolution;
pub use crate::resolution::{Fulfill, IntoResolution, Reject, Resolution, Thenable};

mod state;
pub use crate::state::State;

pub use promises_task::Scheduler;

/// Returns a promise resolved with `value`.
///
/// A [`Promise`] is returned unchanged. A plain value gives an already
/// fulfilled promise and an `Err` an already rejected one.
///
/// ```
/// use promises_core::{resolve, Reason, State};
/// use promises_task::TaskQueue;
///
/// let queue = TaskQueue::new();
/// let scheduler = queue.scheduler();
///
/// let p = resolve(&scheduler, Ok::<_, Reason>(5));
/// assert_eq!(p.state(), State::Fulfilled);
/// assert!(resolve(&scheduler, p.clone()).ptr_eq(&p));
/// ```
pub fn resolve<B>(scheduler: &Scheduler, value: B) -> Promise<B::Value>
where
    B: IntoResolution,
    B::Value: Clone + Send + 'static,
{
    match value.into_resolution() {
        Ok(Resolution::Promise(promise)) => promise,
        Ok(resolution) => {
            let promise = Promise::new(scheduler);
            promise.resolve_with(resolution);
            promise
        }
        Err(reason) => reject(scheduler, reason),
    }
}

/// Returns an already rejected promise.
pub fn reject<T>(scheduler: &Scheduler, reason: impl Into<Reason>) -> Promise<T>
where
    T: Clone + Send + 'static,
{
    let promise = Promise::new(scheduler);
    promise.reject(reason);
    promise
}
