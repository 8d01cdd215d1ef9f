use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use summit_core::ids::{EscalationId, ScheduleId, UserId};
use summit_core::user::User;

/// Counters from one full pass over the open incidents. Exposed for
/// external alerting on persistent sweep failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub checked: u32,
    pub escalated: u32,
}

/// Result of a successful escalation attempt.
#[derive(Debug, Clone)]
pub struct EscalationOutcome {
    pub escalation_id: EscalationId,
    pub level: u32,
    pub target: UserId,
}

/// The technician currently on duty, annotated with the schedule that
/// matched.
#[derive(Debug, Clone)]
pub struct OnCallResolution {
    pub user: User,
    pub schedule_id: ScheduleId,
    pub schedule_name: String,
}

/// One concrete shift window inside a calendar query range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub schedule_id: ScheduleId,
    pub schedule_name: String,
    pub technician_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Escalation notification handed to the email collaborator.
#[derive(Debug, Clone)]
pub struct EscalationEmail {
    pub recipient: String,
    pub recipient_name: String,
    pub incident_summary: String,
    pub reason: String,
}

/// Delivery metadata returned by the notifier.
#[derive(Debug, Clone, Default)]
pub struct NotifyResult {
    pub message_id: Option<String>,
    pub metadata: HashMap<String, String>,
}
