use promises_core::{Promise, Scheduler};
use tracing::trace;

use crate::done;

/// Returns a promise that settles like the first of `promises` to settle.
///
/// An empty input gives a promise that stays pending forever.
///
/// ```
/// use promises_core::Promise;
/// use promises_task::TaskQueue;
/// use promises_test::{assert_fulfilled, drain};
/// use promises_util::race;
///
/// let mut queue = TaskQueue::new();
/// let scheduler = queue.scheduler();
/// let slow = Promise::<&str>::new(&scheduler);
/// let fast = Promise::<&str>::new(&scheduler);
/// let first = race(&scheduler, vec![slow.clone(), fast.clone()]);
///
/// fast.resolve("fast");
/// drain(&mut queue);
/// slow.resolve("slow");
/// drain(&mut queue);
/// assert_fulfilled!(first, "fast");
/// ```
pub fn race<T, I>(scheduler: &Scheduler, promises: I) -> Promise<T>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Promise<T>>,
{
    let result = Promise::new(scheduler);
    let mut count = 0usize;
    for promise in promises {
        count += 1;
        let on_value = result.clone();
        let on_reason = result.clone();
        // Only the first settle call on `result` counts.
        promise.attach(
            move |value| {
                on_value.resolve(value);
                done()
            },
            move |reason| {
                on_reason.reject(reason);
                done()
            },
        );
    }
    trace!(count, "race");
    result
}
