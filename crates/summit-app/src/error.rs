use summit_core::error::DomainError;
use summit_ports::error::{EscalationRequestError, PortError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("port error: {0}")]
    Port(#[from] PortError),
    #[error("incident not found")]
    IncidentNotFound,
    /// No policy level produced a candidate and no fallback responder is
    /// configured. The incident is left unmutated.
    #[error("no escalation target could be resolved")]
    NoEscalationTarget,
}

impl From<AppError> for EscalationRequestError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::IncidentNotFound => Self::IncidentNotFound,
            AppError::NoEscalationTarget => Self::NoEscalationTarget,
            other => Self::Internal(other.to_string()),
        }
    }
}
