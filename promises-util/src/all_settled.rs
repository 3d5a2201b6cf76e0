use std::sync::{Arc, Mutex, PoisonError};

use promises_core::{Promise, Reason, Scheduler};
use tracing::trace;

use crate::done;

/// Returns a promise for the outcome of every promise in `promises`, in input
/// order, once all of them settled.
///
/// The returned promise never rejects.
pub fn all_settled<T, I>(scheduler: &Scheduler, promises: I) -> Promise<Vec<Result<T, Reason>>>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    let result = Promise::new(scheduler);
    trace!(count = promises.len(), "all_settled");
    if promises.is_empty() {
        result.resolve(Vec::new());
        return result;
    }

    let state = Arc::new(Mutex::new(Outcomes { outcomes: vec![None; promises.len()], remaining: promises.len() }));
    for (i, promise) in promises.into_iter().enumerate() {
        let on_value = (state.clone(), result.clone());
        let on_reason = (state.clone(), result.clone());
        promise.attach(
            move |value| {
                record(&on_value.0, &on_value.1, i, Ok(value));
                done()
            },
            move |reason| {
                record(&on_reason.0, &on_reason.1, i, Err(reason));
                done()
            },
        );
    }
    result
}

struct Outcomes<T> {
    outcomes: Vec<Option<Result<T, Reason>>>,
    remaining: usize,
}

fn record<T>(
    state: &Mutex<Outcomes<T>>,
    result: &Promise<Vec<Result<T, Reason>>>,
    i: usize,
    outcome: Result<T, Reason>,
) where
    T: Clone + Send + 'static,
{
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    state.outcomes[i] = Some(outcome);
    state.remaining -= 1;
    if state.remaining == 0 {
        result.resolve(state.outcomes.drain(..).flatten().collect());
    }
}
