use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("not found")]
    NotFound,
    /// Uniqueness conflict on insert. Concurrent sweeps racing on the same
    /// incident surface here; the losing writer treats it as a no-op.
    #[error("duplicate record")]
    Duplicate,
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("connection error: {0}")]
    Connection(String),
}

/// Errors the manual/administrative escalation entry point reports to its
/// caller. The sweep path never surfaces these; it logs and moves on.
#[derive(Debug, Error)]
pub enum EscalationRequestError {
    #[error("incident not found")]
    IncidentNotFound,
    #[error("no escalation target could be resolved")]
    NoEscalationTarget,
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("recipient has no usable address")]
    InvalidRecipient,
    #[error("rate limited")]
    RateLimited,
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}
