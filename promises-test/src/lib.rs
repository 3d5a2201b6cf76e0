//! Utilities to make testing [`Promise`](promises_core::Promise)s easier.

#![warn(missing_docs)]
#![doc(test(attr(deny(warnings), allow(dead_code, unused_assignments, unused_variables))))]

#[doc(hidden)]
pub mod __private {
    pub use promises_core::{Promise, Reason, State};

    pub fn downcast_like<'a, E>(reason: &'a Reason, _like: &E) -> Option<&'a E>
    where
        E: std::error::Error + 'static,
    {
        reason.downcast_ref::<E>()
    }
}

mod assert;

mod record;
pub use crate::record::Recorder;

pub mod thenable;

use promises_task::TaskQueue;
use thiserror::Error;

/// Runs `queue` until it has no more jobs and returns how many ran.
///
/// # Panics
///
/// Panics if called from inside a running job.
pub fn drain(queue: &mut TaskQueue) -> usize {
    queue.run_until_stalled().expect("drain called from inside a task queue run")
}

/// A labelled error for rejections in tests.
///
/// ```
/// use promises_core::Reason;
/// use promises_test::Kind;
///
/// let reason = Reason::from(Kind("Err1"));
/// assert_eq!(reason.downcast_ref::<Kind>(), Some(&Kind("Err1")));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{0}")]
pub struct Kind(pub &'static str);
