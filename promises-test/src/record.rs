use std::sync::{Arc, Mutex, MutexGuard};

/// An ordered log of events, shared between handlers and the test body.
///
/// ```
/// use promises_test::Recorder;
///
/// let recorder = Recorder::new();
/// let r = recorder.clone();
/// r.record("a");
/// recorder.record(format!("b{}", 1));
/// assert_eq!(recorder.take(), ["a", "b1"]);
/// assert!(recorder.events().is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    /// Creates an empty recorder.
    pub fn new() -> Recorder {
        Recorder::default()
    }

    /// Appends an event.
    pub fn record(&self, event: impl Into<String>) {
        self.lock().push(event.into());
    }

    /// A copy of the events recorded so far.
    pub fn events(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Removes and returns the events recorded so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}
