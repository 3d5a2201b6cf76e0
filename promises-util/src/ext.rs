use std::error::Error as StdError;
use std::sync::{Arc, Mutex, PoisonError};

use promises_core::{IntoResolution, Promise, Reason, Resolution};

/// Convenience methods on [`Promise`].
///
/// Each method registers a dependent like [`Promise::then`] does and returns
/// the dependent promise.
pub trait PromiseExt<T> {
    /// Maps the value with `f`. Rejections pass through.
    ///
    /// ```
    /// use promises_core::Promise;
    /// use promises_task::TaskQueue;
    /// use promises_test::{assert_fulfilled, drain};
    /// use promises_util::PromiseExt;
    ///
    /// let mut queue = TaskQueue::new();
    /// let p = Promise::new(&queue.scheduler());
    /// let len = p.map(|s: String| s.len());
    /// p.resolve("four".to_string());
    /// drain(&mut queue);
    /// assert_fulfilled!(len, 4);
    /// ```
    fn map<U, F>(&self, f: F) -> Promise<U>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Clone + Send + 'static;

    /// Maps the rejection reason with `f`. Fulfillments pass through.
    fn map_err<F>(&self, f: F) -> Promise<T>
    where
        F: FnOnce(Reason) -> Reason + Send + 'static;

    /// Handles rejections whose reason is an `E`.
    ///
    /// Any other reason passes through to the returned promise unchanged.
    ///
    /// ```
    /// use promises_core::{Promise, Reason};
    /// use promises_task::TaskQueue;
    /// use promises_test::{assert_fulfilled, assert_rejected, drain, Kind};
    /// use promises_util::PromiseExt;
    ///
    /// let mut queue = TaskQueue::new();
    /// let kind = Promise::<u8>::new(&queue.scheduler());
    /// let other = Promise::<u8>::new(&queue.scheduler());
    /// let recovered = kind.catch_kind(|_: &Kind| Ok::<_, Reason>(0));
    /// let untouched = other.catch_kind(|_: &Kind| Ok::<_, Reason>(0));
    ///
    /// kind.reject(Kind("E"));
    /// other.reject(Reason::msg("not a kind"));
    /// drain(&mut queue);
    /// assert_fulfilled!(recovered, 0);
    /// assert_eq!(assert_rejected!(untouched).to_string(), "not a kind");
    /// ```
    fn catch_kind<E, G, C>(&self, on_rejected: G) -> Promise<T>
    where
        E: StdError + 'static,
        G: FnOnce(&E) -> C + Send + 'static,
        C: IntoResolution<Value = T>;

    /// Runs `f` once this promise settles, either way, then settles the
    /// returned promise with the same outcome.
    ///
    /// If `f` panics the returned promise rejects with the panic instead.
    fn finally<F>(&self, f: F) -> Promise<T>
    where
        F: FnOnce() + Send + 'static;
}

impl<T> PromiseExt<T> for Promise<T>
where
    T: Clone + Send + 'static,
{
    fn map<U, F>(&self, f: F) -> Promise<U>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Clone + Send + 'static,
    {
        self.then(move |value| Ok::<U, Reason>(f(value)))
    }

    fn map_err<F>(&self, f: F) -> Promise<T>
    where
        F: FnOnce(Reason) -> Reason + Send + 'static,
    {
        self.catch(move |reason| Err::<T, Reason>(f(reason)))
    }

    fn catch_kind<E, G, C>(&self, on_rejected: G) -> Promise<T>
    where
        E: StdError + 'static,
        G: FnOnce(&E) -> C + Send + 'static,
        C: IntoResolution<Value = T>,
    {
        self.catch(move |reason| {
            let handled = match reason.downcast_ref::<E>() {
                Some(error) => on_rejected(error).into_resolution(),
                None => Err(reason.clone()),
            };
            Handled(handled)
        })
    }

    fn finally<F>(&self, f: F) -> Promise<T>
    where
        F: FnOnce() + Send + 'static,
    {
        let on_value = Arc::new(Mutex::new(Some(f)));
        let on_reason = on_value.clone();
        self.attach(
            move |value| {
                run_once(&on_value);
                Ok(value)
            },
            move |reason| {
                run_once(&on_reason);
                Err(reason)
            },
        )
    }
}

// A handler outcome that is already converted, including a reason to pass
// on unchanged.
struct Handled<T>(Result<Resolution<T>, Reason>);

impl<T> IntoResolution for Handled<T> {
    type Value = T;

    fn into_resolution(self) -> Result<Resolution<T>, Reason> {
        self.0
    }
}

fn run_once<F: FnOnce()>(f: &Mutex<Option<F>>) {
    let f = f.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(f) = f {
        f();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promises_core::PromiseError;

    #[test]
    fn handled_rethrows_the_same_reason() {
        let reason = Reason::from(PromiseError::SelfResolution);
        match Handled::<u8>(Err(reason.clone())).into_resolution() {
            Err(rethrown) => assert!(rethrown.ptr_eq(&reason)),
            Ok(_) => panic!("expected a rejection"),
        }
    }
}
