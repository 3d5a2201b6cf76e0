use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use promises_task::ScheduleError;
use thiserror::Error;

/// Errors synthesized by the engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PromiseError {
    /// A promise was resolved with itself.
    #[error("a promise must not resolve with itself")]
    SelfResolution,

    /// A handler, setup routine or foreign `then` panicked.
    #[error("panicked: {0}")]
    Panicked(String),

    /// A plain message, see [`Reason::msg`].
    #[error("{0}")]
    Message(String),

    /// The scheduler refused to run a handler.
    #[error("handler could not be scheduled")]
    SchedulerGone(#[from] ScheduleError),
}

/// The reason a promise was rejected.
///
/// Any error type converts into a `Reason`. It is cheap to clone, since a
/// single rejection is delivered to every dependent of the rejected promise.
///
/// ```
/// use promises_core::{PromiseError, Reason};
///
/// let reason = Reason::from(PromiseError::SelfResolution);
/// assert!(reason.is::<PromiseError>());
/// assert_eq!(reason.to_string(), "a promise must not resolve with itself");
/// ```
#[derive(Clone)]
pub struct Reason {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

impl Reason {
    /// Wraps an error.
    pub fn new<E>(error: E) -> Reason
    where
        E: StdError + Send + Sync + 'static,
    {
        Reason { inner: Arc::new(error) }
    }

    /// A reason carrying only a message.
    pub fn msg(message: impl Into<String>) -> Reason {
        Reason::new(PromiseError::Message(message.into()))
    }

    /// Returns the wrapped error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    /// Returns `true` if the wrapped error is of type `E`.
    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.inner.is::<E>()
    }

    /// The wrapped error.
    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }

    /// Returns `true` if both reasons are clones of the same rejection.
    pub fn ptr_eq(&self, other: &Reason) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.inner) as *const u8,
            Arc::as_ptr(&other.inner) as *const u8,
        )
    }

    // A panic carrying a `Reason` rejects with that reason unchanged.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Reason {
        let payload = match payload.downcast::<Reason>() {
            Ok(reason) => return *reason,
            Err(payload) => payload,
        };
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        Reason::new(PromiseError::Panicked(message))
    }
}

impl<E> From<E> for Reason
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Reason {
        Reason::new(error)
    }
}

impl fmt::Debug for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}
