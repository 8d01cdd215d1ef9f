use async_trait::async_trait;
use chrono::{DateTime, Utc};

use summit_core::escalation::{EscalationPolicy, IncidentEscalation};
use summit_core::ids::{CompanyId, IncidentId, UserId};
use summit_core::sla::SlaTracking;

use crate::error::{EscalationRequestError, PortError};
use crate::types::{EscalationOutcome, OnCallResolution, ScheduleEntry};

/// Administrative surface over the escalation engine. The HTTP layer calls
/// these synchronously; `escalate` is the manual-escalation entry point and
/// the only operation that propagates escalation failures to its caller.
#[async_trait]
pub trait EscalationManager: Send + Sync {
    async fn escalate(
        &self,
        incident_id: &IncidentId,
        reason: String,
        escalated_from: Option<UserId>,
        escalated_to: Option<UserId>,
    ) -> Result<EscalationOutcome, EscalationRequestError>;

    async fn list_policies(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<EscalationPolicy>, PortError>;

    async fn escalation_history(
        &self,
        incident: &IncidentId,
    ) -> Result<Vec<IncidentEscalation>, PortError>;
}

#[async_trait]
pub trait OnCallManager: Send + Sync {
    async fn current_on_call(
        &self,
        company: &CompanyId,
        at: DateTime<Utc>,
    ) -> Result<Option<OnCallResolution>, PortError>;

    async fn schedule_for_range(
        &self,
        company: &CompanyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScheduleEntry>, PortError>;

    async fn has_conflict(
        &self,
        technician: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, PortError>;
}

#[async_trait]
pub trait SlaReader: Send + Sync {
    async fn tracking_for_incident(
        &self,
        incident: &IncidentId,
    ) -> Result<Option<SlaTracking>, PortError>;
}
