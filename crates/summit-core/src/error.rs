use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("incident is already resolved")]
    IncidentAlreadyResolved,
    #[error("incident is already escalated")]
    IncidentAlreadyEscalated,
    #[error("policy requires at least one escalation level")]
    PolicyRequiresLevel,
    #[error("escalation level requires a role or user target")]
    LevelRequiresTarget,
    #[error("invalid schedule window")]
    InvalidScheduleWindow,
    #[error("escalation is already acknowledged")]
    EscalationAlreadyAcknowledged,
    #[error("invalid id: {0}")]
    InvalidId(String),
}
