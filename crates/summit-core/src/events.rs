use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::{CompanyId, EscalationId, IncidentId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DomainEvent {
    IncidentEscalated(IncidentEscalated),
    EscalationNotificationFailed(EscalationNotificationFailed),
}

impl DomainEvent {
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::IncidentEscalated(e) => e.occurred_at,
            Self::EscalationNotificationFailed(e) => e.occurred_at,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::IncidentEscalated(_) => "incident.escalated",
            Self::EscalationNotificationFailed(_) => "escalation.notification_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentEscalated {
    pub incident_id: IncidentId,
    pub company_id: CompanyId,
    pub level: u32,
    pub target: UserId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscalationNotificationFailed {
    pub escalation_id: EscalationId,
    pub incident_id: IncidentId,
    pub target: UserId,
    pub error: String,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        chrono::DateTime::parse_from_rfc3339("2025-03-10T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn escalated_event_carries_context() {
        let incident_id = IncidentId::new();
        let event = DomainEvent::IncidentEscalated(IncidentEscalated {
            incident_id: incident_id.clone(),
            company_id: CompanyId::new(),
            level: 1,
            target: UserId::new(),
            reason: "SLA breach detected".into(),
            occurred_at: now(),
        });
        assert_eq!(event.event_type(), "incident.escalated");
        assert_eq!(event.occurred_at(), now());
        if let DomainEvent::IncidentEscalated(e) = &event {
            assert_eq!(e.incident_id, incident_id);
            assert_eq!(e.level, 1);
        }
    }

    #[test]
    fn notification_failure_event_carries_error() {
        let event =
            DomainEvent::EscalationNotificationFailed(EscalationNotificationFailed {
                escalation_id: EscalationId::new(),
                incident_id: IncidentId::new(),
                target: UserId::new(),
                error: "mailbox unavailable".into(),
                occurred_at: now(),
            });
        assert_eq!(event.event_type(), "escalation.notification_failed");
    }
}
