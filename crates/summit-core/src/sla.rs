use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CompanyId, IncidentId, SlaPolicyId, TrackingId};
use crate::severity::Severity;

/// Per-severity resolution budgets, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTargets {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl ResolutionTargets {
    pub fn for_severity(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaPolicy {
    id: SlaPolicyId,
    company_id: CompanyId,
    name: String,
    enabled: bool,
    resolution_targets: ResolutionTargets,
    acknowledgment_target_minutes: u32,
    notify_on_breach: bool,
    breach_recipients: Vec<String>,
}

impl SlaPolicy {
    pub fn new(
        company_id: CompanyId,
        name: String,
        resolution_targets: ResolutionTargets,
        acknowledgment_target_minutes: u32,
        notify_on_breach: bool,
        breach_recipients: Vec<String>,
    ) -> Self {
        Self {
            id: SlaPolicyId::new(),
            company_id,
            name,
            enabled: true,
            resolution_targets,
            acknowledgment_target_minutes,
            notify_on_breach,
            breach_recipients,
        }
    }

    pub fn id(&self) -> &SlaPolicyId {
        &self.id
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn resolution_target_minutes(&self, severity: Severity) -> u32 {
        self.resolution_targets.for_severity(severity)
    }

    pub fn acknowledgment_target_minutes(&self) -> u32 {
        self.acknowledgment_target_minutes
    }

    pub fn notify_on_breach(&self) -> bool {
        self.notify_on_breach
    }

    pub fn breach_recipients(&self) -> &[String] {
        &self.breach_recipients
    }
}

/// Per-incident SLA bookkeeping. The incident-update path owns the
/// mutations; the escalation engine only reads the two breach flags.
/// Breach flags are monotonic: once set they never clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaTracking {
    id: TrackingId,
    incident_id: IncidentId,
    policy_id: SlaPolicyId,
    created_at: DateTime<Utc>,
    acknowledged_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
    acknowledgment_breached: bool,
    resolution_breached: bool,
    time_to_acknowledge_minutes: Option<i64>,
    time_to_resolve_minutes: Option<i64>,
}

impl SlaTracking {
    pub fn new(incident_id: IncidentId, policy_id: SlaPolicyId, now: DateTime<Utc>) -> Self {
        Self {
            id: TrackingId::new(),
            incident_id,
            policy_id,
            created_at: now,
            acknowledged_at: None,
            resolved_at: None,
            acknowledgment_breached: false,
            resolution_breached: false,
            time_to_acknowledge_minutes: None,
            time_to_resolve_minutes: None,
        }
    }

    /// Records first acknowledgment; later calls are no-ops.
    pub fn record_acknowledgment(&mut self, now: DateTime<Utc>) {
        if self.acknowledged_at.is_none() {
            self.acknowledged_at = Some(now);
            self.time_to_acknowledge_minutes =
                Some(now.signed_duration_since(self.created_at).num_minutes());
        }
    }

    /// Records first resolution; later calls are no-ops.
    pub fn record_resolution(&mut self, now: DateTime<Utc>) {
        if self.resolved_at.is_none() {
            self.resolved_at = Some(now);
            self.time_to_resolve_minutes =
                Some(now.signed_duration_since(self.created_at).num_minutes());
        }
    }

    pub fn mark_acknowledgment_breached(&mut self) {
        self.acknowledgment_breached = true;
    }

    pub fn mark_resolution_breached(&mut self) {
        self.resolution_breached = true;
    }

    pub fn breached(&self) -> bool {
        self.acknowledgment_breached || self.resolution_breached
    }

    pub fn id(&self) -> &TrackingId {
        &self.id
    }

    pub fn incident_id(&self) -> &IncidentId {
        &self.incident_id
    }

    pub fn policy_id(&self) -> &SlaPolicyId {
        &self.policy_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn acknowledged_at(&self) -> Option<DateTime<Utc>> {
        self.acknowledged_at
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    pub fn acknowledgment_breached(&self) -> bool {
        self.acknowledgment_breached
    }

    pub fn resolution_breached(&self) -> bool {
        self.resolution_breached
    }

    pub fn time_to_acknowledge_minutes(&self) -> Option<i64> {
        self.time_to_acknowledge_minutes
    }

    pub fn time_to_resolve_minutes(&self) -> Option<i64> {
        self.time_to_resolve_minutes
    }
}
