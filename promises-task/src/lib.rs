//! Deferred-work queue for promise handlers.
//!
//! Promise handlers never run inside the call that makes them runnable.
//! Instead they are submitted as [`Job`]s through a [`Scheduler`] and executed
//! later, one at a time and in submission order, by whoever owns the
//! matching [`TaskQueue`].
//!
//! ```
//! use promises_task::TaskQueue;
//! use std::sync::{Arc, Mutex};
//!
//! let mut queue = TaskQueue::new();
//! let scheduler = queue.scheduler();
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! for i in 0..3 {
//!     let log = log.clone();
//!     scheduler.schedule(Box::new(move || log.lock().unwrap().push(i))).unwrap();
//! }
//! assert!(log.lock().unwrap().is_empty());
//!
//! assert_eq!(queue.run_until_stalled().unwrap(), 3);
//! assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
//! ```

#![warn(missing_docs)]
#![doc(test(attr(deny(warnings), allow(dead_code, unused_assignments, unused_variables))))]

mod enter;
pub use crate::enter::{enter, Enter, EnterError};

mod schedule;
pub use crate::schedule::{Job, Schedule, ScheduleError, Scheduler};

mod queue;
pub use crate::queue::{Builder, TaskQueue};
