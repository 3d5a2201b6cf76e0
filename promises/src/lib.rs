//! Deferred values with chained handlers.
//!
//! A [`Promise`] stands for a value, or an error, that may not be known yet.
//! Producers settle it once; consumers attach handlers with
//! [`then`](Promise::then), [`catch`](Promise::catch) and
//! [`attach`](Promise::attach), each of which returns a new promise for the
//! handler's outcome. A handler may return a plain value, another promise to
//! adopt, or a foreign [`Thenable`](promise::Thenable).
//!
//! Handlers always run as jobs on a [`Scheduler`](task::Scheduler), one at a
//! time and in the order they became runnable. The simplest scheduler is a
//! [`TaskQueue`](task::TaskQueue) driven by the calling thread:
//!
//! ```
//! use promises::prelude::*;
//! use promises::task::TaskQueue;
//!
//! let mut queue = TaskQueue::new();
//! let f = Promise::new(&queue.scheduler());
//! let g = f.then(|v: u32| Ok(v + 1)).map(|v| v.to_string());
//! f.resolve(41);
//!
//! assert_eq!(queue.run_until(g).unwrap().unwrap(), "42");
//! ```

#![warn(missing_docs)]
#![doc(test(attr(deny(warnings), allow(dead_code, unused_assignments, unused_variables))))]

#[doc(no_inline)]
pub use promises_core::{reject, resolve, Promise, Reason};

pub mod promise {
    //! The promise type and the resolution procedure.
    //!
    //! This module contains:
    //!
    //! - [`Promise`] and its [`Resolver`].
    //! - [`Resolution`], the values a promise can be resolved with, and
    //!   [`IntoResolution`], the handler return types.
    //! - [`Thenable`] with its [`Fulfill`] and [`Reject`] callbacks, for
    //!   adopting foreign promise-like objects.
    //! - Extension methods in [`PromiseExt`] and the combinators [`all`],
    //!   [`all_settled`], [`race`] and [`any`].

    pub use promises_core::{
        reject, resolve, Fulfill, IntoResolution, Promise, PromiseError, Reason, Reject, Resolution,
        Resolver, State, Thenable,
    };

    pub use promises_util::{all, all_settled, any, race, AggregateError, PromiseExt};
}

pub mod task {
    //! Running handlers.
    //!
    //! Every promise carries a [`Scheduler`], and every handler attached to it
    //! is submitted there as a [`Job`]. [`TaskQueue`] runs jobs in submission
    //! order on the thread that drives it; any [`Schedule`] implementation
    //! can stand in for it.

    pub use promises_task::{enter, Builder, Enter, EnterError, Job, Schedule, ScheduleError, Scheduler, TaskQueue};
}

pub mod prelude {
    //! A "prelude" for crates using the `promises` crate.
    //!
    //! ```
    //! # #[allow(unused_imports)]
    //! use promises::prelude::*;
    //! ```

    pub use crate::promise::{Promise, Reason, Resolution, State};

    #[doc(no_inline)]
    pub use crate::promise::PromiseExt as _;
}
