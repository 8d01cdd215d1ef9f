use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CompanyId, EscalationId, IncidentId, UserId};

/// One escalation event. Append-only history: created exactly once, never
/// deleted, and the only permitted mutation is recording acknowledgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentEscalation {
    id: EscalationId,
    incident_id: IncidentId,
    company_id: CompanyId,
    level: u32,
    reason: String,
    escalated_from: Option<UserId>,
    escalated_to: UserId,
    escalated_at: DateTime<Utc>,
    acknowledged: bool,
    acknowledged_at: Option<DateTime<Utc>>,
}

impl IncidentEscalation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        incident_id: IncidentId,
        company_id: CompanyId,
        level: u32,
        reason: String,
        escalated_from: Option<UserId>,
        escalated_to: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EscalationId::new(),
            incident_id,
            company_id,
            level,
            reason,
            escalated_from,
            escalated_to,
            escalated_at: now,
            acknowledged: false,
            acknowledged_at: None,
        }
    }

    pub fn acknowledge(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.acknowledged {
            return Err(DomainError::EscalationAlreadyAcknowledged);
        }
        self.acknowledged = true;
        self.acknowledged_at = Some(now);
        Ok(())
    }

    pub fn id(&self) -> &EscalationId {
        &self.id
    }

    pub fn incident_id(&self) -> &IncidentId {
        &self.incident_id
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn escalated_from(&self) -> Option<&UserId> {
        self.escalated_from.as_ref()
    }

    pub fn escalated_to(&self) -> &UserId {
        &self.escalated_to
    }

    pub fn escalated_at(&self) -> DateTime<Utc> {
        self.escalated_at
    }

    pub fn acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn acknowledged_at(&self) -> Option<DateTime<Utc>> {
        self.acknowledged_at
    }
}
