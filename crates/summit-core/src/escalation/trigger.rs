use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::incident::{Incident, Status};
use crate::sla::SlaTracking;

/// A single trigger condition from an escalation policy. The persistence
/// boundary stores these as an open key/value map; inside the domain they
/// are a closed tagged type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCondition {
    UnacknowledgedMinutes(i64),
    PriorityMin(u32),
    SlaBreached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationReason {
    Unacknowledged { minutes: i64, threshold: i64 },
    HighPriority { score: u32, threshold: u32 },
    SlaBreach,
    Manual(String),
}

impl std::fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unacknowledged { minutes, threshold } => write!(
                f,
                "unacknowledged for {minutes} minutes (threshold {threshold})"
            ),
            Self::HighPriority { score, threshold } => {
                write!(f, "priority score {score} at or above {threshold}")
            }
            Self::SlaBreach => write!(f, "SLA breach detected"),
            Self::Manual(reason) => write!(f, "{reason}"),
        }
    }
}

/// Evaluates trigger conditions against one incident. Pure; the caller
/// supplies everything it reads.
///
/// Precedence is fixed regardless of the order conditions were configured
/// in: unacknowledged duration, then priority threshold, then SLA breach.
/// The first rule that fires wins.
pub fn first_matching_reason(
    conditions: &[TriggerCondition],
    incident: &Incident,
    tracking: Option<&SlaTracking>,
    now: DateTime<Utc>,
) -> Option<EscalationReason> {
    for condition in conditions {
        if let TriggerCondition::UnacknowledgedMinutes(threshold) = condition {
            let minutes = incident.age_minutes(now);
            if incident.status() == Status::New && minutes >= *threshold {
                return Some(EscalationReason::Unacknowledged {
                    minutes,
                    threshold: *threshold,
                });
            }
        }
    }

    for condition in conditions {
        if let TriggerCondition::PriorityMin(threshold) = condition {
            if incident.priority_score() >= *threshold {
                return Some(EscalationReason::HighPriority {
                    score: incident.priority_score(),
                    threshold: *threshold,
                });
            }
        }
    }

    if conditions.contains(&TriggerCondition::SlaBreached) {
        if let Some(tracking) = tracking {
            if tracking.acknowledgment_breached() || tracking.resolution_breached() {
                return Some(EscalationReason::SlaBreach);
            }
        }
    }

    None
}
