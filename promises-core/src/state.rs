/// The settlement state of a [`Promise`](crate::Promise).
///
/// A promise starts `Pending` and moves to one of the two terminal states at
/// most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Not settled yet.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with a [`Reason`](crate::Reason).
    Rejected,
}

impl State {
    /// Returns `true` for `Pending`.
    pub fn is_pending(self) -> bool {
        self == State::Pending
    }

    /// Returns `true` for either terminal state.
    pub fn is_settled(self) -> bool {
        !self.is_pending()
    }

    pub(crate) fn of<T, E>(result: Option<&Result<T, E>>) -> State {
        match result {
            None => State::Pending,
            Some(Ok(_)) => State::Fulfilled,
            Some(Err(_)) => State::Rejected,
        }
    }
}
