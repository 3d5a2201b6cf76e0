use std::convert::identity;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::Waker;

use promises_task::Scheduler;
use tracing::{trace, warn};

use crate::error::{PromiseError, Reason};
use crate::relay::{self, Handled, Link, OnFulfilled, OnRejected, Step, Successor};
use crate::resolution::{self, IntoResolution, Resolution};
use crate::state::State;

/// A value, or an error, that may not be known yet.
///
/// A `Promise` starts pending and settles at most once, either fulfilled with
/// a `T` or rejected with a [`Reason`]. Handlers attached with
/// [`then`](Promise::then), [`catch`](Promise::catch) or
/// [`attach`](Promise::attach) run on the promise's [`Scheduler`] after it
/// settles, never inside the call that registers them or settles the promise,
/// and each returns a new promise for the handler's outcome.
///
/// Cloning a `Promise` yields another handle to the same promise.
///
/// ```
/// use promises_core::Promise;
/// use promises_task::TaskQueue;
/// use std::sync::{Arc, Mutex};
///
/// let mut queue = TaskQueue::new();
/// let seen = Arc::new(Mutex::new(None));
///
/// let f = Promise::new(&queue.scheduler());
/// let seen2 = seen.clone();
/// f.then(|v: u32| Ok(v + 1)).then(move |r: u32| {
///     *seen2.lock().unwrap() = Some(r);
///     Ok(())
/// });
/// f.resolve(41);
///
/// queue.run_until_stalled().unwrap();
/// assert_eq!(*seen.lock().unwrap(), Some(42));
/// ```
pub struct Promise<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    scheduler: Scheduler,
    slot: Mutex<Slot<T>>,
}

struct Slot<T> {
    // `None` while pending. Never changes once set.
    result: Option<Result<T, Reason>>,
    // Set by the first call to a settle entry point, so later calls are
    // ignored even while an adopted promise is still pending.
    locked: bool,
    successors: Vec<Box<dyn Successor<T>>>,
    adopters: Vec<Promise<T>>,
    wakers: Vec<Waker>,
}

/// The settle capability of a [`Promise`], handed to setup routines.
///
/// ```
/// use promises_core::{Promise, Reason, State};
/// use promises_task::TaskQueue;
///
/// let queue = TaskQueue::new();
/// let promise = Promise::<u8>::with_setup(&queue.scheduler(), |resolver| {
///     resolver.reject(Reason::msg("no"));
///     Ok(())
/// });
/// assert_eq!(promise.state(), State::Rejected);
/// ```
pub struct Resolver<T> {
    promise: Promise<T>,
}

impl<T> Promise<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a pending promise whose handlers run on `scheduler`.
    pub fn new(scheduler: &Scheduler) -> Promise<T> {
        Promise {
            inner: Arc::new(Inner {
                scheduler: scheduler.clone(),
                slot: Mutex::new(Slot {
                    result: None,
                    locked: false,
                    successors: Vec::new(),
                    adopters: Vec::new(),
                    wakers: Vec::new(),
                }),
            }),
        }
    }

    /// Creates a promise and runs `setup` on it synchronously.
    ///
    /// An `Err` returned by `setup`, or a panic inside it, rejects the
    /// promise unless `setup` already settled it.
    pub fn with_setup<S>(scheduler: &Scheduler, setup: S) -> Promise<T>
    where
        S: FnOnce(Resolver<T>) -> Result<(), Reason>,
    {
        let promise = Promise::new(scheduler);
        let resolver = promise.resolver();
        match panic::catch_unwind(AssertUnwindSafe(move || setup(resolver))) {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => promise.reject(reason),
            Err(payload) => promise.reject(Reason::from_panic(payload)),
        }
        promise
    }

    /// Returns a [`Resolver`] for this promise.
    pub fn resolver(&self) -> Resolver<T> {
        Resolver { promise: self.clone() }
    }

    /// The scheduler this promise and its dependents run handlers on.
    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// The current state.
    pub fn state(&self) -> State {
        State::of(self.lock().result.as_ref())
    }

    /// Returns `true` while the promise has not settled.
    pub fn is_pending(&self) -> bool {
        self.state().is_pending()
    }

    /// The outcome, once settled.
    pub fn result(&self) -> Option<Result<T, Reason>> {
        self.lock().result.clone()
    }

    /// Returns `true` if both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Fulfills the promise with `value`.
    ///
    /// Ignored if the promise was already resolved or rejected.
    pub fn resolve(&self, value: T) {
        self.resolve_with(Resolution::Value(value))
    }

    /// Resolves the promise with a value, another promise to adopt, or a
    /// foreign thenable.
    ///
    /// Ignored if the promise was already resolved or rejected. Resolving a
    /// promise with itself rejects it with [`PromiseError::SelfResolution`].
    pub fn resolve_with(&self, resolution: impl Into<Resolution<T>>) {
        if self.lock_in() {
            resolution::resolve(self, resolution.into());
        }
    }

    /// Rejects the promise.
    ///
    /// Ignored if the promise was already resolved or rejected.
    pub fn reject(&self, reason: impl Into<Reason>) {
        if self.lock_in() {
            self.deliver(Err(reason.into()));
        }
    }

    /// Runs `on_fulfilled` with the value once this promise fulfills.
    ///
    /// A rejection passes through to the returned promise unchanged.
    pub fn then<F, B>(&self, on_fulfilled: F) -> Promise<B::Value>
    where
        F: FnOnce(T) -> B + Send + 'static,
        B: IntoResolution,
        B::Value: Clone + Send + 'static,
    {
        let on_fulfilled: OnFulfilled<T, B::Value> =
            OnFulfilled::Run(Box::new(move |value| on_fulfilled(value).into_resolution()));
        self.register(on_fulfilled, None)
    }

    /// Runs `on_rejected` with the reason once this promise rejects.
    ///
    /// A fulfillment passes through to the returned promise unchanged.
    pub fn catch<G, C>(&self, on_rejected: G) -> Promise<T>
    where
        G: FnOnce(Reason) -> C + Send + 'static,
        C: IntoResolution<Value = T>,
    {
        let on_rejected: OnRejected<T> = Box::new(move |reason| on_rejected(reason).into_resolution());
        self.register(OnFulfilled::Forward(identity as fn(T) -> T), Some(on_rejected))
    }

    /// Runs exactly one of the handlers, depending on how this promise
    /// settles.
    pub fn attach<F, B, G, C>(&self, on_fulfilled: F, on_rejected: G) -> Promise<B::Value>
    where
        F: FnOnce(T) -> B + Send + 'static,
        B: IntoResolution,
        B::Value: Clone + Send + 'static,
        G: FnOnce(Reason) -> C + Send + 'static,
        C: IntoResolution<Value = B::Value>,
    {
        let on_fulfilled: OnFulfilled<T, B::Value> =
            OnFulfilled::Run(Box::new(move |value| on_fulfilled(value).into_resolution()));
        let on_rejected: OnRejected<B::Value> = Box::new(move |reason| on_rejected(reason).into_resolution());
        self.register(on_fulfilled, Some(on_rejected))
    }

    /// Returns a new promise that settles exactly like this one, without
    /// running any handler.
    pub fn forward(&self) -> Promise<T> {
        self.register(OnFulfilled::Forward(identity as fn(T) -> T), None)
    }

    fn register<R>(&self, on_fulfilled: OnFulfilled<T, R>, on_rejected: Option<OnRejected<R>>) -> Promise<R>
    where
        R: Clone + Send + 'static,
    {
        let dependent = Promise::new(&self.inner.scheduler);
        let link = Box::new(Link { dependent: dependent.clone(), on_fulfilled, on_rejected });
        let settled = {
            let mut slot = self.lock();
            match slot.result.clone() {
                Some(result) => result,
                None => {
                    slot.successors.push(link);
                    return dependent;
                }
            }
        };
        if let Some(step) = link.grab(settled) {
            relay::drive(step);
        }
        dependent
    }

    /// Makes `adopter` settle like this promise.
    pub(crate) fn adopt(&self, adopter: &Promise<T>) {
        let settled = {
            let mut slot = self.lock();
            match slot.result.clone() {
                Some(result) => result,
                None => {
                    trace!(promise = ?self.id(), adopter = ?adopter.id(), "adoption registered");
                    slot.adopters.push(adopter.clone());
                    return;
                }
            }
        };
        adopter.deliver(settled);
    }

    /// Records the terminal state and relays it to every dependent.
    ///
    /// Ignored if the promise already settled.
    pub(crate) fn deliver(&self, result: Result<T, Reason>) {
        relay::drive(self.step(result));
    }

    /// The delivery of `result` to this promise, to be run by [`relay::drive`].
    pub(crate) fn step(&self, result: Result<T, Reason>) -> Step {
        let promise = self.clone();
        Step(Box::new(move |steps| promise.settle(result, steps)))
    }

    // Pass-through successors and adopters are queued on `steps` rather than
    // settled here, so long chains never recurse.
    fn settle(&self, result: Result<T, Reason>, steps: &mut Vec<Step>) {
        let (successors, adopters, wakers) = {
            let mut slot = self.lock();
            if slot.result.is_some() {
                trace!(promise = ?self.id(), "already settled; ignored");
                return;
            }
            slot.result = Some(result.clone());
            slot.locked = true;
            (
                mem::take(&mut slot.successors),
                mem::take(&mut slot.adopters),
                mem::take(&mut slot.wakers),
            )
        };
        trace!(
            promise = ?self.id(),
            state = ?State::of(Some(&result)),
            successors = successors.len(),
            adopters = adopters.len(),
            "promise settled"
        );
        let mut next = Vec::new();
        for successor in successors {
            next.extend(successor.grab(result.clone()));
        }
        next.extend(adopters.iter().map(|adopter| adopter.step(result.clone())));
        // Reversed so the worklist visits dependents in registration order.
        steps.extend(next.into_iter().rev());
        for waker in wakers {
            waker.wake();
        }
    }

    /// Schedules `handler` and settles this promise with its outcome.
    ///
    /// Returns the rejection to deliver if the scheduler refuses the job.
    pub(crate) fn run_later<H>(&self, handler: H) -> Option<Step>
    where
        H: FnOnce() -> Handled<T> + Send + 'static,
    {
        let dependent = self.clone();
        let job = Box::new(move || {
            let handled = panic::catch_unwind(AssertUnwindSafe(handler))
                .unwrap_or_else(|payload| Err(Reason::from_panic(payload)));
            match handled {
                Ok(resolution) => resolution::resolve(&dependent, resolution),
                Err(reason) => dependent.deliver(Err(reason)),
            }
        });
        trace!(promise = ?self.id(), "handler scheduled");
        match self.inner.scheduler.schedule(job) {
            Ok(()) => None,
            Err(err) => {
                warn!(promise = ?self.id(), error = %err, "handler refused by scheduler");
                Some(self.step(Err(Reason::new(PromiseError::SchedulerGone(err)))))
            }
        }
    }

    pub(crate) fn register_waker(&self, waker: &Waker) -> Option<Result<T, Reason>> {
        let mut slot = self.lock();
        if let Some(result) = slot.result.as_ref() {
            return Some(result.clone());
        }
        if !slot.wakers.iter().any(|w| w.will_wake(waker)) {
            slot.wakers.push(waker.clone());
        }
        None
    }

    // Returns `true` for the first settle call only.
    fn lock_in(&self) -> bool {
        let mut slot = self.lock();
        if slot.locked {
            trace!(promise = ?self.id(), "settle call ignored");
            false
        } else {
            slot.locked = true;
            true
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // No user code runs under this lock.
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn id(&self) -> *const () {
        Arc::as_ptr(&self.inner) as *const ()
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Promise<T> {
        Promise { inner: self.inner.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Promise")
            .field("state", &State::of(slot.result.as_ref()))
            .field("result", &slot.result)
            .finish()
    }
}

impl<T> Resolver<T>
where
    T: Clone + Send + 'static,
{
    /// See [`Promise::resolve`].
    pub fn resolve(&self, value: T) {
        self.promise.resolve(value)
    }

    /// See [`Promise::resolve_with`].
    pub fn resolve_with(&self, resolution: impl Into<Resolution<T>>) {
        self.promise.resolve_with(resolution)
    }

    /// See [`Promise::reject`].
    pub fn reject(&self, reason: impl Into<Reason>) {
        self.promise.reject(reason)
    }
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Resolver<T> {
        Resolver { promise: self.promise.clone() }
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}
