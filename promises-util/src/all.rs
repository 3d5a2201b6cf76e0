use std::sync::{Arc, Mutex, PoisonError};

use promises_core::{Promise, Scheduler};
use tracing::trace;

use crate::done;

/// Returns a promise for every value of `promises`, in input order.
///
/// Rejects with the first rejection, without waiting for the rest. An empty
/// input fulfills with an empty `Vec`.
///
/// ```
/// use promises_core::Promise;
/// use promises_task::TaskQueue;
/// use promises_test::{assert_rejected, drain, Kind};
/// use promises_util::all;
///
/// let mut queue = TaskQueue::new();
/// let scheduler = queue.scheduler();
/// let a = Promise::<u8>::new(&scheduler);
/// let b = Promise::<u8>::new(&scheduler);
/// let both = all(&scheduler, vec![a.clone(), b.clone()]);
///
/// b.reject(Kind("b failed"));
/// drain(&mut queue);
/// assert_rejected!(both, Kind("b failed"));
/// ```
pub fn all<T, I>(scheduler: &Scheduler, promises: I) -> Promise<Vec<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    let result = Promise::new(scheduler);
    trace!(count = promises.len(), "all");
    if promises.is_empty() {
        result.resolve(Vec::new());
        return result;
    }

    let state = Arc::new(Mutex::new(Collect { values: vec![None; promises.len()], remaining: promises.len() }));
    for (i, promise) in promises.into_iter().enumerate() {
        let state = state.clone();
        let on_value = result.clone();
        let on_reason = result.clone();
        promise.attach(
            move |value| {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                state.values[i] = Some(value);
                state.remaining -= 1;
                if state.remaining == 0 {
                    on_value.resolve(state.values.drain(..).flatten().collect());
                }
                done()
            },
            move |reason| {
                on_reason.reject(reason);
                done()
            },
        );
    }
    result
}

struct Collect<T> {
    values: Vec<Option<T>>,
    remaining: usize,
}
