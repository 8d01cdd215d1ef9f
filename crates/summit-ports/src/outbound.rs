use async_trait::async_trait;
use chrono::{DateTime, Utc};

use summit_core::escalation::{EscalationPolicy, IncidentEscalation};
use summit_core::events::DomainEvent;
use summit_core::ids::{CompanyId, IncidentId, UserId};
use summit_core::incident::Incident;
use summit_core::schedule::OnCallSchedule;
use summit_core::sla::{SlaPolicy, SlaTracking};
use summit_core::user::{Role, User};

use crate::error::{NotifyError, PortError};
use crate::types::{EscalationEmail, NotifyResult};

#[async_trait]
pub trait IncidentRepository: Send + Sync {
    async fn save(&self, incident: &Incident) -> Result<(), PortError>;
    async fn find_by_id(&self, id: &IncidentId) -> Result<Option<Incident>, PortError>;
    /// Incidents with status in {new, in_progress} — the sweep's working set.
    async fn find_open(&self) -> Result<Vec<Incident>, PortError>;
}

#[async_trait]
pub trait EscalationPolicyRepository: Send + Sync {
    async fn save(&self, policy: &EscalationPolicy) -> Result<(), PortError>;
    async fn find_by_company(&self, company: &CompanyId) -> Result<Vec<EscalationPolicy>, PortError>;
    /// Enabled policies only, in stable (insertion) order.
    async fn find_enabled_by_company(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<EscalationPolicy>, PortError>;
}

#[async_trait]
pub trait IncidentEscalationRepository: Send + Sync {
    /// Atomic, uniqueness-enforcing insert: a second record for the same
    /// incident must fail with `PortError::Duplicate`.
    async fn insert(&self, escalation: &IncidentEscalation) -> Result<(), PortError>;
    async fn find_by_incident(
        &self,
        incident: &IncidentId,
    ) -> Result<Vec<IncidentEscalation>, PortError>;
    async fn count_for_incident(&self, incident: &IncidentId) -> Result<u32, PortError>;
    async fn mark_acknowledged(
        &self,
        escalation: &summit_core::ids::EscalationId,
        at: DateTime<Utc>,
    ) -> Result<(), PortError>;
}

#[async_trait]
pub trait SlaPolicyRepository: Send + Sync {
    async fn save(&self, policy: &SlaPolicy) -> Result<(), PortError>;
    async fn find_by_company(&self, company: &CompanyId) -> Result<Vec<SlaPolicy>, PortError>;
}

#[async_trait]
pub trait SlaTrackingRepository: Send + Sync {
    async fn save(&self, tracking: &SlaTracking) -> Result<(), PortError>;
    async fn find_by_incident(
        &self,
        incident: &IncidentId,
    ) -> Result<Option<SlaTracking>, PortError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn save(&self, schedule: &OnCallSchedule) -> Result<(), PortError>;
    async fn find_by_company(&self, company: &CompanyId) -> Result<Vec<OnCallSchedule>, PortError>;
    async fn find_by_technician(&self, technician: &UserId)
        -> Result<Vec<OnCallSchedule>, PortError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: &User) -> Result<(), PortError>;
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PortError>;
    async fn find_by_company_and_role(
        &self,
        company: &CompanyId,
        role: Role,
    ) -> Result<Vec<User>, PortError>;
}

/// Email collaborator. Failures are logged by callers, never propagated as
/// escalation failures.
#[async_trait]
pub trait EscalationNotifier: Send + Sync {
    async fn send_escalation_email(
        &self,
        email: &EscalationEmail,
    ) -> Result<NotifyResult, NotifyError>;
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), PortError>;
}
