//! The resolution procedure: what a raw value means for the promise it
//! resolves.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[cfg(feature = "portable-atomic")]
use portable_atomic::AtomicBool;
#[cfg(not(feature = "portable-atomic"))]
use std::sync::atomic::AtomicBool;

use tracing::{debug, trace};

use crate::error::{PromiseError, Reason};
use crate::promise::Promise;

/// A value a promise can be resolved with.
///
/// Resolving with a `Value` fulfills the promise. Resolving with another
/// `Promise` makes the promise adopt that promise's eventual state. Resolving
/// with a `Thenable` hands the promise's settle callbacks to a foreign
/// promise-like object.
pub enum Resolution<T> {
    /// A plain value.
    Value(T),
    /// A promise of this engine.
    Promise(Promise<T>),
    /// A foreign promise-like object.
    Thenable(Box<dyn Thenable<T>>),
}

impl<T> Resolution<T> {
    /// Boxes a foreign promise-like object.
    pub fn thenable<U>(thenable: U) -> Resolution<T>
    where
        U: Thenable<T> + 'static,
    {
        Resolution::Thenable(Box::new(thenable))
    }
}

impl<T> From<Promise<T>> for Resolution<T> {
    fn from(promise: Promise<T>) -> Resolution<T> {
        Resolution::Promise(promise)
    }
}

impl<T: fmt::Debug> fmt::Debug for Resolution<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Resolution::Promise(promise) => f.debug_tuple("Promise").field(promise).finish(),
            Resolution::Thenable(_) => f.debug_tuple("Thenable").finish(),
        }
    }
}

/// Conversion of a handler's return value into a [`Resolution`].
///
/// Handlers may return:
///
/// * `Result<T, Reason>`: `Ok` is a plain value, `Err` rejects the dependent
///   like a thrown exception would;
/// * a [`Promise<T>`](Promise) to adopt;
/// * a [`Resolution<T>`], which covers foreign thenables.
pub trait IntoResolution {
    /// The value type the resolution fulfills with.
    type Value;

    /// Performs the conversion.
    fn into_resolution(self) -> Result<Resolution<Self::Value>, Reason>;
}

impl<T> IntoResolution for Result<T, Reason> {
    type Value = T;

    fn into_resolution(self) -> Result<Resolution<T>, Reason> {
        self.map(Resolution::Value)
    }
}

impl<T> IntoResolution for Promise<T> {
    type Value = T;

    fn into_resolution(self) -> Result<Resolution<T>, Reason> {
        Ok(Resolution::Promise(self))
    }
}

impl<T> IntoResolution for Resolution<T> {
    type Value = T;

    fn into_resolution(self) -> Result<Resolution<T>, Reason> {
        Ok(self)
    }
}

/// A foreign promise-like object that can be adopted.
///
/// `then` receives two callbacks. Only the first callback invocation, across
/// both of them and all of their clones, has any effect. Returning `Err` or
/// panicking rejects the adopting promise unless a callback already ran.
///
/// ```
/// use promises_core::{Fulfill, Promise, Reason, Reject, Resolution, State, Thenable};
/// use promises_task::TaskQueue;
///
/// struct Ready(u32);
///
/// impl Thenable<u32> for Ready {
///     fn then(self: Box<Self>, on_fulfilled: Fulfill<u32>, _: Reject<u32>) -> Result<(), Reason> {
///         on_fulfilled.resolve(self.0);
///         Ok(())
///     }
/// }
///
/// let queue = TaskQueue::new();
/// let promise = Promise::new(&queue.scheduler());
/// promise.resolve_with(Resolution::thenable(Ready(7)));
/// assert_eq!(promise.state(), State::Fulfilled);
/// ```
pub trait Thenable<T>: Send {
    /// Subscribes the callbacks to this object's outcome.
    fn then(self: Box<Self>, on_fulfilled: Fulfill<T>, on_rejected: Reject<T>) -> Result<(), Reason>;
}

/// The fulfillment callback handed to a [`Thenable`].
pub struct Fulfill<T> {
    once: Once<T>,
}

/// The rejection callback handed to a [`Thenable`].
pub struct Reject<T> {
    once: Once<T>,
}

struct Once<T> {
    target: Promise<T>,
    called: Arc<AtomicBool>,
}

impl<T> Once<T> {
    fn claim(&self) -> bool {
        !self.called.swap(true, Ordering::AcqRel)
    }
}

impl<T> Clone for Once<T> {
    fn clone(&self) -> Once<T> {
        Once { target: self.target.clone(), called: self.called.clone() }
    }
}

impl<T: Clone + Send + 'static> Fulfill<T> {
    /// Resolves the adopting promise with `value`.
    ///
    /// Returns `false` if a callback was already invoked.
    pub fn resolve(&self, value: T) -> bool {
        self.resolve_with(Resolution::Value(value))
    }

    /// Resolves the adopting promise with `resolution`, which may itself be a
    /// promise or another thenable.
    ///
    /// Returns `false` if a callback was already invoked.
    pub fn resolve_with(&self, resolution: impl Into<Resolution<T>>) -> bool {
        if !self.once.claim() {
            trace!("thenable fulfilled after settling; ignored");
            return false;
        }
        resolve(&self.once.target, resolution.into());
        true
    }
}

impl<T: Clone + Send + 'static> Reject<T> {
    /// Rejects the adopting promise.
    ///
    /// Returns `false` if a callback was already invoked.
    pub fn reject(&self, reason: impl Into<Reason>) -> bool {
        if !self.once.claim() {
            trace!("thenable rejected after settling; ignored");
            return false;
        }
        self.once.target.deliver(Err(reason.into()));
        true
    }
}

impl<T> Clone for Fulfill<T> {
    fn clone(&self) -> Fulfill<T> {
        Fulfill { once: self.once.clone() }
    }
}

impl<T> Clone for Reject<T> {
    fn clone(&self) -> Reject<T> {
        Reject { once: self.once.clone() }
    }
}

impl<T> fmt::Debug for Fulfill<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fulfill").field("called", &self.once.called.load(Ordering::Acquire)).finish()
    }
}

impl<T> fmt::Debug for Reject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject").field("called", &self.once.called.load(Ordering::Acquire)).finish()
    }
}

/// Settles `target` according to `resolution`.
///
/// Only ever delivers a terminal state to `target` (now, or later through an
/// adoption link); handler slots are not touched.
pub(crate) fn resolve<T>(target: &Promise<T>, resolution: Resolution<T>)
where
    T: Clone + Send + 'static,
{
    match resolution {
        Resolution::Value(value) => target.deliver(Ok(value)),
        Resolution::Promise(promise) => {
            if promise.ptr_eq(target) {
                debug!("promise resolved with itself");
                target.deliver(Err(Reason::new(PromiseError::SelfResolution)));
            } else {
                promise.adopt(target);
            }
        }
        Resolution::Thenable(thenable) => {
            let once = Once { target: target.clone(), called: Arc::new(AtomicBool::new(false)) };
            let on_fulfilled = Fulfill { once: once.clone() };
            let on_rejected = Reject { once };
            let fallback = on_rejected.clone();

            let outcome =
                panic::catch_unwind(AssertUnwindSafe(move || thenable.then(on_fulfilled, on_rejected)));
            let reason = match outcome {
                Ok(Ok(())) => return,
                Ok(Err(reason)) => reason,
                Err(payload) => Reason::from_panic(payload),
            };
            fallback.reject(reason);
        }
    }
}
