use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use summit_core::escalation::{
    first_matching_reason, EscalationPolicy, EscalationReason, IncidentEscalation, SlaBreachAction,
};
use summit_core::error::DomainError;
use summit_core::events::{DomainEvent, EscalationNotificationFailed};
use summit_core::ids::{CompanyId, IncidentId, UserId};
use summit_core::incident::{Incident, Status};
use summit_ports::error::{EscalationRequestError, PortError};
use summit_ports::inbound::EscalationManager;
use summit_ports::outbound::{
    EscalationNotifier, EscalationPolicyRepository, EventPublisher, IncidentEscalationRepository,
    IncidentRepository, SlaTrackingRepository, UserRepository,
};
use summit_ports::types::{EscalationEmail, EscalationOutcome, SweepReport};

use crate::error::AppError;
use crate::monitor::SweepRunner;

/// Deployment-level engine settings. The fallback responder replaces the
/// legacy "any administrative user" database scan: it is the account that
/// receives escalations no policy level can place.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub fallback_responder: Option<UserId>,
}

/// The escalation engine: evaluates trigger conditions over open incidents,
/// resolves targets, records escalations, and requests notifications.
pub struct EscalationService<I, P, E, T, U, N, EP>
where
    I: IncidentRepository,
    P: EscalationPolicyRepository,
    E: IncidentEscalationRepository,
    T: SlaTrackingRepository,
    U: UserRepository,
    N: EscalationNotifier,
    EP: EventPublisher,
{
    incidents: I,
    policies: P,
    escalations: E,
    sla_tracking: T,
    users: U,
    notifier: N,
    events: EP,
    config: EngineConfig,
}

impl<I, P, E, T, U, N, EP> EscalationService<I, P, E, T, U, N, EP>
where
    I: IncidentRepository,
    P: EscalationPolicyRepository,
    E: IncidentEscalationRepository,
    T: SlaTrackingRepository,
    U: UserRepository,
    N: EscalationNotifier,
    EP: EventPublisher,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        incidents: I,
        policies: P,
        escalations: E,
        sla_tracking: T,
        users: U,
        notifier: N,
        events: EP,
        config: EngineConfig,
    ) -> Self {
        Self {
            incidents,
            policies,
            escalations,
            sla_tracking,
            users,
            notifier,
            events,
            config,
        }
    }

    /// One sweep over every open incident. Failures on a single incident
    /// are logged and skipped so one bad record cannot halt the monitor.
    pub async fn check_and_escalate_incidents(
        &self,
        now: DateTime<Utc>,
    ) -> Result<SweepReport, AppError> {
        let incidents = self.incidents.find_open().await?;
        let mut report = SweepReport::default();

        for incident in &incidents {
            report.checked += 1;
            match self.evaluate_incident(incident, now).await {
                Ok(true) => report.escalated += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(incident = %incident.id(), error = %err, "sweep item failed");
                }
            }
        }

        info!(
            checked = report.checked,
            escalated = report.escalated,
            "escalation sweep complete"
        );
        Ok(report)
    }

    async fn evaluate_incident(
        &self,
        incident: &Incident,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let Some(reason) = self.should_escalate(incident, now).await? else {
            return Ok(false);
        };
        debug!(incident = %incident.id(), reason = %reason, "trigger condition fired");
        self.escalate_incident(incident.id(), reason, None, None, now)
            .await?;
        Ok(true)
    }

    /// Trigger evaluation, first match wins: no enabled policy means never
    /// escalate; an existing escalation record means never escalate again;
    /// otherwise each policy's conditions are checked in the fixed
    /// unacknowledged / priority / SLA-breach order.
    pub async fn should_escalate(
        &self,
        incident: &Incident,
        now: DateTime<Utc>,
    ) -> Result<Option<EscalationReason>, AppError> {
        let policies = self
            .policies
            .find_enabled_by_company(incident.company_id())
            .await?;
        if policies.is_empty() {
            return Ok(None);
        }

        if self.escalations.count_for_incident(incident.id()).await? > 0 {
            return Ok(None);
        }

        let tracking = self.sla_tracking.find_by_incident(incident.id()).await?;

        for policy in &policies {
            let reason = first_matching_reason(
                policy.trigger_conditions(),
                incident,
                tracking.as_ref(),
                now,
            );
            match reason {
                Some(EscalationReason::SlaBreach)
                    if policy.sla_breach_action() == SlaBreachAction::NotifyOnly =>
                {
                    continue;
                }
                Some(reason) => return Ok(Some(reason)),
                None => {}
            }
        }
        Ok(None)
    }

    /// Records one escalation: computes the next level, resolves the target
    /// unless supplied, inserts the history record, transitions the
    /// incident, and requests a notification. Losing a concurrent-insert
    /// race is a no-op success reporting the surviving record.
    pub async fn escalate_incident(
        &self,
        incident_id: &IncidentId,
        reason: EscalationReason,
        escalated_from: Option<UserId>,
        escalated_to: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<EscalationOutcome, AppError> {
        let mut incident = self
            .incidents
            .find_by_id(incident_id)
            .await?
            .ok_or(AppError::IncidentNotFound)?;

        // Reject closed incidents before the insert so the error path never
        // leaves a record in the append-only history.
        match incident.status() {
            Status::Resolved => return Err(DomainError::IncidentAlreadyResolved.into()),
            Status::Escalated => return Err(DomainError::IncidentAlreadyEscalated.into()),
            Status::New | Status::InProgress => {}
        }

        let level = self.escalations.count_for_incident(incident_id).await? + 1;

        let target = match escalated_to {
            Some(target) => target,
            None => self
                .resolve_target(incident.company_id(), level)
                .await?
                .ok_or(AppError::NoEscalationTarget)?,
        };

        let record = IncidentEscalation::new(
            incident_id.clone(),
            incident.company_id().clone(),
            level,
            reason.to_string(),
            escalated_from,
            target.clone(),
            now,
        );

        match self.escalations.insert(&record).await {
            Ok(()) => {}
            Err(PortError::Duplicate) => {
                info!(incident = %incident_id, "escalation already recorded by a concurrent sweep");
                let existing = self.escalations.find_by_incident(incident_id).await?;
                let surviving = existing.first().ok_or(PortError::NotFound)?;
                return Ok(EscalationOutcome {
                    escalation_id: surviving.id().clone(),
                    level: surviving.level(),
                    target: surviving.escalated_to().clone(),
                });
            }
            Err(other) => return Err(other.into()),
        }

        let events = incident.escalate_to(target.clone(), level, reason.to_string(), now)?;
        self.incidents.save(&incident).await?;
        self.events.publish(events).await?;

        self.request_notification(&record, &incident, now).await;

        Ok(EscalationOutcome {
            escalation_id: record.id().clone(),
            level,
            target,
        })
    }

    /// Picks the user for an escalation level. Explicit target users win,
    /// then the first configured role with any company-scoped member
    /// (lowest user id within the role, so the pick is deterministic),
    /// then the deployment fallback responder.
    pub async fn resolve_target(
        &self,
        company: &CompanyId,
        level: u32,
    ) -> Result<Option<UserId>, AppError> {
        let policies = self.policies.find_enabled_by_company(company).await?;
        let Some(policy) = policies.first() else {
            return Ok(self.config.fallback_responder.clone());
        };

        let level_config = policy.level_for(level);

        if let Some(user) = level_config.target_users().first() {
            return Ok(Some(user.clone()));
        }

        for role in level_config.notify_roles() {
            let candidates = self.users.find_by_company_and_role(company, *role).await?;
            if let Some(user) = candidates.into_iter().min_by(|a, b| a.id().cmp(b.id())) {
                return Ok(Some(user.id().clone()));
            }
        }

        Ok(self.config.fallback_responder.clone())
    }

    /// Fire-and-forget relative to the state transition: delivery failures
    /// are logged and recorded as events, never rolled back into the
    /// escalation result.
    async fn request_notification(
        &self,
        record: &IncidentEscalation,
        incident: &Incident,
        now: DateTime<Utc>,
    ) {
        let recipient = match self.users.find_by_id(record.escalated_to()).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(target = %record.escalated_to(), "escalation target has no user record");
                return;
            }
            Err(err) => {
                warn!(error = %err, "could not load escalation target for notification");
                return;
            }
        };

        let email = EscalationEmail {
            recipient: recipient.email().to_string(),
            recipient_name: recipient.username().to_string(),
            incident_summary: incident.title().to_string(),
            reason: record.reason().to_string(),
        };

        if let Err(err) = self.notifier.send_escalation_email(&email).await {
            warn!(
                incident = %incident.id(),
                target = %record.escalated_to(),
                error = %err,
                "escalation notification failed"
            );
            let event = DomainEvent::EscalationNotificationFailed(EscalationNotificationFailed {
                escalation_id: record.id().clone(),
                incident_id: incident.id().clone(),
                target: record.escalated_to().clone(),
                error: err.to_string(),
                occurred_at: now,
            });
            if let Err(publish_err) = self.events.publish(vec![event]).await {
                warn!(error = %publish_err, "could not record notification failure");
            }
        }
    }
}

#[async_trait]
impl<I, P, E, T, U, N, EP> SweepRunner for EscalationService<I, P, E, T, U, N, EP>
where
    I: IncidentRepository,
    P: EscalationPolicyRepository,
    E: IncidentEscalationRepository,
    T: SlaTrackingRepository,
    U: UserRepository,
    N: EscalationNotifier,
    EP: EventPublisher,
{
    async fn run_sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        self.check_and_escalate_incidents(now).await
    }
}

#[async_trait]
impl<I, P, E, T, U, N, EP> EscalationManager for EscalationService<I, P, E, T, U, N, EP>
where
    I: IncidentRepository,
    P: EscalationPolicyRepository,
    E: IncidentEscalationRepository,
    T: SlaTrackingRepository,
    U: UserRepository,
    N: EscalationNotifier,
    EP: EventPublisher,
{
    async fn escalate(
        &self,
        incident_id: &IncidentId,
        reason: String,
        escalated_from: Option<UserId>,
        escalated_to: Option<UserId>,
    ) -> Result<EscalationOutcome, EscalationRequestError> {
        self.escalate_incident(
            incident_id,
            EscalationReason::Manual(reason),
            escalated_from,
            escalated_to,
            Utc::now(),
        )
        .await
        .map_err(Into::into)
    }

    async fn list_policies(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<EscalationPolicy>, PortError> {
        self.policies.find_by_company(company).await
    }

    async fn escalation_history(
        &self,
        incident: &IncidentId,
    ) -> Result<Vec<IncidentEscalation>, PortError> {
        self.escalations.find_by_incident(incident).await
    }
}
