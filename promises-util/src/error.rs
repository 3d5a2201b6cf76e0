use promises_core::Reason;
use thiserror::Error;

/// Every promise given to [`any`](crate::any) rejected.
///
/// Holds the rejection reasons in input order.
#[derive(Debug, Clone, Error)]
#[error("all {} promises were rejected", .reasons.len())]
pub struct AggregateError {
    reasons: Vec<Reason>,
}

impl AggregateError {
    pub(crate) fn new(reasons: Vec<Reason>) -> AggregateError {
        AggregateError { reasons }
    }

    /// The rejection reasons, in input order.
    pub fn reasons(&self) -> &[Reason] {
        &self.reasons
    }

    /// Consumes the error, returning the rejection reasons.
    pub fn into_reasons(self) -> Vec<Reason> {
        self.reasons
    }
}
