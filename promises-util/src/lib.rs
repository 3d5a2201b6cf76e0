//! Combinators and extension methods for [`Promise`](promises_core::Promise)s.
//!
//! Everything here is built on the registration methods of
//! [`Promise`](promises_core::Promise), so the usual rules hold: handlers run
//! as jobs on the promise's scheduler and never inside the call that
//! registers them.
//!
//! ```
//! use promises_core::Promise;
//! use promises_task::TaskQueue;
//! use promises_util::{all, PromiseExt};
//!
//! let mut queue = TaskQueue::new();
//! let scheduler = queue.scheduler();
//! let a = Promise::<u32>::new(&scheduler);
//! let b = Promise::<u32>::new(&scheduler);
//! let sum = all(&scheduler, vec![a.clone(), b.clone()]).map(|values| values.iter().sum::<u32>());
//!
//! b.resolve(2);
//! a.resolve(1);
//! assert_eq!(queue.run_until(sum).unwrap().unwrap(), 3);
//! ```

#![warn(missing_docs)]
#![doc(test(attr(deny(warnings), allow(dead_code, unused_assignments, unused_variables))))]

mod all;
pub use crate::all::all;

mod all_settled;
pub use crate::all_settled::all_settled;

mod any;
pub use crate::any::any;

mod error;
pub use crate::error::AggregateError;

mod ext;
pub use crate::ext::PromiseExt;

mod race;
pub use crate::race::race;

use promises_core::Reason;

// Return value of handlers registered only for their side effects.
fn done() -> Result<(), Reason> {
    Ok(())
}
