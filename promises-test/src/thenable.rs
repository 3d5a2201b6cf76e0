//! Foreign [`Thenable`] fixtures, well-behaved and otherwise.

use std::fmt;
use std::sync::{Arc, Mutex};

use promises_core::{Fulfill, Reason, Reject, Thenable};

/// A thenable implemented by a closure.
///
/// ```
/// use promises_core::{Promise, Resolution};
/// use promises_task::TaskQueue;
/// use promises_test::{assert_fulfilled, thenable};
///
/// let queue = TaskQueue::new();
/// let p = Promise::new(&queue.scheduler());
/// p.resolve_with(Resolution::thenable(thenable::from_fn(|ok, _| {
///     ok.resolve(1);
///     Ok(())
/// })));
/// assert_fulfilled!(p, 1);
/// ```
pub fn from_fn<T, F>(f: F) -> FromFn<F>
where
    F: FnOnce(Fulfill<T>, Reject<T>) -> Result<(), Reason> + Send,
{
    FromFn { f }
}

/// Thenable returned by [`from_fn`].
pub struct FromFn<F> {
    f: F,
}

impl<T, F> Thenable<T> for FromFn<F>
where
    F: FnOnce(Fulfill<T>, Reject<T>) -> Result<(), Reason> + Send,
{
    fn then(self: Box<Self>, on_fulfilled: Fulfill<T>, on_rejected: Reject<T>) -> Result<(), Reason> {
        (self.f)(on_fulfilled, on_rejected)
    }
}

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

/// Fulfills with its value, then tries to reject as well.
#[derive(Debug, Clone)]
pub struct CallsBoth<T> {
    /// The value passed to the fulfill callback.
    pub value: T,
    /// The reason passed to the reject callback afterwards.
    pub reason: Reason,
}

impl<T: Clone + Send + 'static> Thenable<T> for CallsBoth<T> {
    fn then(self: Box<Self>, on_fulfilled: Fulfill<T>, on_rejected: Reject<T>) -> Result<(), Reason> {
        on_fulfilled.resolve(self.value);
        on_rejected.reject(self.reason);
        Ok(())
    }
}

/// Calls the fulfill callback twice, with two different values.
#[derive(Debug, Clone)]
pub struct FulfillsTwice<T>(pub T, pub T);

impl<T: Clone + Send + 'static> Thenable<T> for FulfillsTwice<T> {
    fn then(self: Box<Self>, on_fulfilled: Fulfill<T>, _: Reject<T>) -> Result<(), Reason> {
        let again = on_fulfilled.clone();
        on_fulfilled.resolve(self.0);
        again.resolve(self.1);
        Ok(())
    }
}

/// Fulfills, then reports a failure from `then` itself.
#[derive(Debug, Clone)]
pub struct FailsAfterFulfill<T> {
    /// The value passed to the fulfill callback.
    pub value: T,
    /// The error returned afterwards.
    pub reason: Reason,
}

impl<T: Clone + Send + 'static> Thenable<T> for FailsAfterFulfill<T> {
    fn then(self: Box<Self>, on_fulfilled: Fulfill<T>, _: Reject<T>) -> Result<(), Reason> {
        on_fulfilled.resolve(self.value);
        Err(self.reason)
    }
}

/// Panics without calling either callback.
#[derive(Debug, Clone, Copy)]
pub struct Panics(pub &'static str);

impl<T> Thenable<T> for Panics {
    fn then(self: Box<Self>, _: Fulfill<T>, _: Reject<T>) -> Result<(), Reason> {
        panic!("{}", self.0)
    }
}

/// A thenable that settles whenever the test says so.
///
/// `then` only stores the callbacks; [`Trigger`] invokes them later.
///
/// ```
/// use promises_core::{Promise, Resolution};
/// use promises_task::TaskQueue;
/// use promises_test::{assert_fulfilled, assert_pending, thenable::Deferred};
///
/// let queue = TaskQueue::new();
/// let (deferred, trigger) = Deferred::new();
/// let p = Promise::new(&queue.scheduler());
/// p.resolve_with(Resolution::thenable(deferred));
/// assert_pending!(p);
/// trigger.fulfill(9);
/// assert_fulfilled!(p, 9);
/// ```
#[derive(Debug)]
pub struct Deferred<T> {
    callbacks: Callbacks<T>,
}

/// Settles the [`Deferred`] it was created with.
#[derive(Debug, Clone)]
pub struct Trigger<T> {
    callbacks: Callbacks<T>,
}

type Callbacks<T> = Arc<Mutex<Option<(Fulfill<T>, Reject<T>)>>>;

impl<T: Clone + Send + 'static> Deferred<T> {
    /// Creates the thenable and its trigger.
    pub fn new() -> (Deferred<T>, Trigger<T>) {
        let callbacks = Arc::new(Mutex::new(None));
        (Deferred { callbacks: callbacks.clone() }, Trigger { callbacks })
    }
}

impl<T: Clone + Send + 'static> Thenable<T> for Deferred<T> {
    fn then(self: Box<Self>, on_fulfilled: Fulfill<T>, on_rejected: Reject<T>) -> Result<(), Reason> {
        *self.callbacks.lock().unwrap() = Some((on_fulfilled, on_rejected));
        Ok(())
    }
}

impl<T: Clone + Send + 'static> Trigger<T> {
    /// Invokes the fulfill callback. Returns what the callback returned.
    ///
    /// # Panics
    ///
    /// Panics if the thenable was never subscribed to.
    pub fn fulfill(&self, value: T) -> bool {
        self.callbacks().0.resolve(value)
    }

    /// Invokes the reject callback. Returns what the callback returned.
    ///
    /// # Panics
    ///
    /// Panics if the thenable was never subscribed to.
    pub fn reject(&self, reason: impl Into<Reason>) -> bool {
        self.callbacks().1.reject(reason)
    }

    /// Returns `true` once `then` was called.
    pub fn is_subscribed(&self) -> bool {
        self.callbacks.lock().unwrap().is_some()
    }

    fn callbacks(&self) -> (Fulfill<T>, Reject<T>) {
        self.callbacks.lock().unwrap().clone().expect("thenable was never subscribed to")
    }
}
