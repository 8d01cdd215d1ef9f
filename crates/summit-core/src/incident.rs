use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::{DomainEvent, IncidentEscalated};
use crate::ids::{CompanyId, IncidentId, UserId};
use crate::severity::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    New,
    InProgress,
    Escalated,
    Resolved,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Escalated => "escalated",
            Self::Resolved => "resolved",
        }
    }

    /// Statuses the escalation sweep considers. Escalated and resolved
    /// incidents are out of play.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::New | Self::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    id: IncidentId,
    company_id: CompanyId,
    title: String,
    severity: Severity,
    status: Status,
    priority_score: u32,
    created_at: DateTime<Utc>,
    assigned_to: Option<UserId>,
    escalation_level: u32,
    escalated_at: Option<DateTime<Utc>>,
}

impl Incident {
    pub fn new(
        company_id: CompanyId,
        title: String,
        severity: Severity,
        priority_score: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: IncidentId::new(),
            company_id,
            title,
            severity,
            status: Status::New,
            priority_score,
            created_at: now,
            assigned_to: None,
            escalation_level: 0,
            escalated_at: None,
        }
    }

    /// Whole minutes elapsed since the incident was opened.
    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.created_at).num_minutes()
    }

    pub fn begin_work(&mut self, user_id: UserId) -> Result<(), DomainError> {
        match self.status {
            Status::Resolved => Err(DomainError::IncidentAlreadyResolved),
            _ => {
                self.status = Status::InProgress;
                self.assigned_to = Some(user_id);
                Ok(())
            }
        }
    }

    pub fn escalate_to(
        &mut self,
        target: UserId,
        level: u32,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        match self.status {
            Status::Resolved => Err(DomainError::IncidentAlreadyResolved),
            Status::Escalated => Err(DomainError::IncidentAlreadyEscalated),
            Status::New | Status::InProgress => {
                self.status = Status::Escalated;
                self.assigned_to = Some(target.clone());
                self.escalation_level = level;
                self.escalated_at = Some(now);
                Ok(vec![DomainEvent::IncidentEscalated(IncidentEscalated {
                    incident_id: self.id.clone(),
                    company_id: self.company_id.clone(),
                    level,
                    target,
                    reason,
                    occurred_at: now,
                })])
            }
        }
    }

    pub fn resolve(&mut self) -> Result<(), DomainError> {
        match self.status {
            Status::Resolved => Err(DomainError::IncidentAlreadyResolved),
            _ => {
                self.status = Status::Resolved;
                Ok(())
            }
        }
    }

    pub fn id(&self) -> &IncidentId {
        &self.id
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn priority_score(&self) -> u32 {
        self.priority_score
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn assigned_to(&self) -> Option<&UserId> {
        self.assigned_to.as_ref()
    }

    pub fn escalation_level(&self) -> u32 {
        self.escalation_level
    }

    pub fn escalated_at(&self) -> Option<DateTime<Utc>> {
        self.escalated_at
    }
}
