//! Dependents of a pending promise and how a settlement reaches them.

use crate::error::Reason;
use crate::promise::Promise;
use crate::resolution::Resolution;

pub(crate) type Handled<R> = Result<Resolution<R>, Reason>;

pub(crate) type OnRejected<R> = Box<dyn FnOnce(Reason) -> Handled<R> + Send>;

/// A pending delivery to one promise, with its value type erased.
///
/// Running a step may queue further steps instead of delivering to them
/// directly, so chains of any length settle without growing the stack.
pub(crate) struct Step(pub(crate) Box<dyn FnOnce(&mut Vec<Step>)>);

/// Runs `first` and every step it queues, depth first.
pub(crate) fn drive(first: Step) {
    let mut steps = vec![first];
    while let Some(step) = steps.pop() {
        (step.0)(&mut steps);
    }
}

/// What happens to a dependent when its predecessor fulfills.
pub(crate) enum OnFulfilled<T, R> {
    /// Run a handler in a later task.
    Run(Box<dyn FnOnce(T) -> Handled<R> + Send>),
    /// No handler: hand the value straight to the dependent.
    Forward(fn(T) -> R),
}

/// A dependent registered on a predecessor, waiting for it to settle.
pub(crate) trait Successor<T>: Send {
    /// Receives the predecessor's terminal state. Consumes the handlers.
    ///
    /// Returns the delivery to the dependent when no handler runs.
    fn grab(self: Box<Self>, result: Result<T, Reason>) -> Option<Step>;
}

pub(crate) struct Link<T, R> {
    pub(crate) dependent: Promise<R>,
    pub(crate) on_fulfilled: OnFulfilled<T, R>,
    pub(crate) on_rejected: Option<OnRejected<R>>,
}

impl<T, R> Successor<T> for Link<T, R>
where
    T: Send + 'static,
    R: Clone + Send + 'static,
{
    fn grab(self: Box<Self>, result: Result<T, Reason>) -> Option<Step> {
        let Link { dependent, on_fulfilled, on_rejected } = *self;
        // The handler that does not match is dropped here, unrun.
        match (result, on_fulfilled) {
            (Ok(value), OnFulfilled::Run(handler)) => dependent.run_later(move || handler(value)),
            (Ok(value), OnFulfilled::Forward(forward)) => Some(dependent.step(Ok(forward(value)))),
            (Err(reason), _) => match on_rejected {
                Some(handler) => dependent.run_later(move || handler(reason)),
                None => Some(dependent.step(Err(reason))),
            },
        }
    }
}
