use std::sync::{Arc, Mutex, PoisonError};

use promises_core::{Promise, Reason, Scheduler};
use tracing::trace;

use crate::done;
use crate::error::AggregateError;

/// Returns a promise for the first value among `promises`.
///
/// Rejects with an [`AggregateError`] holding every reason once all of them
/// rejected. An empty input rejects immediately.
///
/// ```
/// use promises_core::Promise;
/// use promises_task::TaskQueue;
/// use promises_test::{assert_fulfilled, drain, Kind};
/// use promises_util::any;
///
/// let mut queue = TaskQueue::new();
/// let scheduler = queue.scheduler();
/// let a = Promise::<u8>::new(&scheduler);
/// let b = Promise::<u8>::new(&scheduler);
/// let first_ok = any(&scheduler, vec![a.clone(), b.clone()]);
///
/// a.reject(Kind("down"));
/// b.resolve(2);
/// drain(&mut queue);
/// assert_fulfilled!(first_ok, 2);
/// ```
pub fn any<T, I>(scheduler: &Scheduler, promises: I) -> Promise<T>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    let result = Promise::new(scheduler);
    trace!(count = promises.len(), "any");
    if promises.is_empty() {
        result.reject(AggregateError::new(Vec::new()));
        return result;
    }

    let state = Arc::new(Mutex::new(Rejections { reasons: vec![None; promises.len()], remaining: promises.len() }));
    for (i, promise) in promises.into_iter().enumerate() {
        let state = state.clone();
        let on_value = result.clone();
        let on_reason = result.clone();
        promise.attach(
            move |value| {
                on_value.resolve(value);
                done()
            },
            move |reason| {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                state.reasons[i] = Some(reason);
                state.remaining -= 1;
                if state.remaining == 0 {
                    let reasons = state.reasons.drain(..).flatten().collect();
                    on_reason.reject(AggregateError::new(reasons));
                }
                done()
            },
        );
    }
    result
}

struct Rejections {
    reasons: Vec<Option<Reason>>,
    remaining: usize,
}
