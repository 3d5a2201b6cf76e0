/// Assert that the promise has not settled.
///
/// ```
/// use promises_core::Promise;
/// use promises_task::TaskQueue;
/// use promises_test::assert_pending;
///
/// let queue = TaskQueue::new();
/// let p = Promise::<u8>::new(&queue.scheduler());
/// assert_pending!(p);
/// ```
#[macro_export]
macro_rules! assert_pending {
    ($promise:expr) => {{
        let state = $crate::__private::Promise::state(&$promise);
        if state != $crate::__private::State::Pending {
            panic!("assertion failed: expected promise to be pending but it is {:?}", state);
        }
    }};
}

/// Assert that the promise fulfilled with the given value.
///
/// ```
/// use promises_core::Promise;
/// use promises_task::TaskQueue;
/// use promises_test::assert_fulfilled;
///
/// let queue = TaskQueue::new();
/// let p = Promise::new(&queue.scheduler());
/// p.resolve(3);
/// assert_fulfilled!(p, 3);
/// ```
#[macro_export]
macro_rules! assert_fulfilled {
    ($promise:expr, $value:expr) => {{
        match $crate::__private::Promise::result(&$promise) {
            Some(Ok(value)) => assert_eq!(value, $value),
            Some(Err(reason)) => {
                panic!("assertion failed: expected promise to fulfill but it rejected with {:?}", reason)
            }
            None => panic!("assertion failed: expected promise to fulfill but it is pending"),
        }
    }};
}

/// Assert that the promise rejected, and return its reason.
///
/// With a second argument, also assert that the reason is that error.
///
/// ```
/// use promises_core::{Promise, Reason};
/// use promises_task::TaskQueue;
/// use promises_test::{assert_rejected, Kind};
///
/// let queue = TaskQueue::new();
/// let p = Promise::<u8>::new(&queue.scheduler());
/// p.reject(Kind("E"));
/// assert_rejected!(p, Kind("E"));
/// let reason: Reason = assert_rejected!(p);
/// ```
#[macro_export]
macro_rules! assert_rejected {
    ($promise:expr) => {{
        match $crate::__private::Promise::result(&$promise) {
            Some(Err(reason)) => reason,
            Some(Ok(_)) => panic!("assertion failed: expected promise to reject but it fulfilled"),
            None => panic!("assertion failed: expected promise to reject but it is pending"),
        }
    }};
    ($promise:expr, $error:expr) => {{
        let reason: $crate::__private::Reason = $crate::assert_rejected!($promise);
        let expected = $error;
        match $crate::__private::downcast_like(&reason, &expected) {
            Some(actual) => assert_eq!(*actual, expected),
            None => panic!(
                "assertion failed: promise rejected with unexpected reason {:?}, expected {:?}",
                reason, expected
            ),
        }
        reason
    }};
}
