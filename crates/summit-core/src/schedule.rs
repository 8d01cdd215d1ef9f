use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CompanyId, ScheduleId, UserId};

/// The recurrence shape of an on-call window. Daily and weekly windows are
/// times-of-day in UTC; an end at or before the start wraps past midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleKind {
    OneTime {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Daily {
        start: NaiveTime,
        end: NaiveTime,
    },
    Weekly {
        days: Vec<Weekday>,
        start: NaiveTime,
        end: NaiveTime,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnCallSchedule {
    id: ScheduleId,
    company_id: CompanyId,
    technician_id: UserId,
    name: String,
    kind: ScheduleKind,
    enabled: bool,
    priority: i32,
}

impl OnCallSchedule {
    pub fn new(
        company_id: CompanyId,
        technician_id: UserId,
        name: String,
        kind: ScheduleKind,
        priority: i32,
    ) -> Result<Self, DomainError> {
        match &kind {
            ScheduleKind::OneTime { start, end } => {
                if end <= start {
                    return Err(DomainError::InvalidScheduleWindow);
                }
            }
            ScheduleKind::Daily { start, end } => {
                if start == end {
                    return Err(DomainError::InvalidScheduleWindow);
                }
            }
            ScheduleKind::Weekly { days, start, end } => {
                if days.is_empty() || start == end {
                    return Err(DomainError::InvalidScheduleWindow);
                }
            }
        }
        Ok(Self {
            id: ScheduleId::new(),
            company_id,
            technician_id,
            name,
            kind,
            enabled: true,
            priority,
        })
    }

    /// Whether this schedule's window contains the given instant. Recurring
    /// windows that wrap midnight are anchored on their start day, so a
    /// Monday 22:00-02:00 weekly window covers Tuesday 01:00.
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        let tod = at.time();
        match &self.kind {
            ScheduleKind::OneTime { start, end } => at >= *start && at < *end,
            ScheduleKind::Daily { start, end } => tod_contains(*start, *end, tod),
            ScheduleKind::Weekly { days, start, end } => {
                if start < end {
                    days.contains(&at.weekday()) && tod >= *start && tod < *end
                } else {
                    (days.contains(&at.weekday()) && tod >= *start)
                        || (days.contains(&at.weekday().pred()) && tod < *end)
                }
            }
        }
    }

    /// Concrete windows this schedule produces within `[start, end)`,
    /// clipped to the range. Used for calendar views and conflict checks.
    pub fn occurrences_within(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        if range_end <= range_start {
            return vec![];
        }
        let mut windows = vec![];
        match &self.kind {
            ScheduleKind::OneTime { start, end } => {
                windows.push((*start, *end));
            }
            ScheduleKind::Daily { start, end } => {
                // Anchor one day early to catch windows wrapping into the range.
                let mut day = (range_start - Duration::days(1)).date_naive();
                let last = range_end.date_naive();
                while day <= last {
                    windows.push(anchored_window(day, *start, *end));
                    day += Duration::days(1);
                }
            }
            ScheduleKind::Weekly { days, start, end } => {
                let mut day = (range_start - Duration::days(1)).date_naive();
                let last = range_end.date_naive();
                while day <= last {
                    if days.contains(&day.weekday()) {
                        windows.push(anchored_window(day, *start, *end));
                    }
                    day += Duration::days(1);
                }
            }
        }
        windows
            .into_iter()
            .filter(|(s, e)| *s < range_end && *e > range_start)
            .map(|(s, e)| (s.max(range_start), e.min(range_end)))
            .collect()
    }

    /// Conflict rules for schedule editors: one-time windows conflict only
    /// on temporal overlap, daily windows conflict whenever their
    /// time-of-day window overlaps, weekly windows only on matching
    /// weekdays.
    pub fn conflicts_with(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        !self.occurrences_within(start, end).is_empty()
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn id(&self) -> &ScheduleId {
        &self.id
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn technician_id(&self) -> &UserId {
        &self.technician_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ScheduleKind {
        &self.kind
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}

fn tod_contains(start: NaiveTime, end: NaiveTime, tod: NaiveTime) -> bool {
    if start < end {
        tod >= start && tod < end
    } else {
        tod >= start || tod < end
    }
}

fn anchored_window(
    day: chrono::NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let s = day.and_time(start).and_utc();
    let e = if start < end {
        day.and_time(end).and_utc()
    } else {
        (day + Duration::days(1)).and_time(end).and_utc()
    };
    (s, e)
}

/// Picks the schedule on duty at `at` among the given set: enabled and
/// covering schedules only, highest priority wins, equal priorities break
/// toward the lowest schedule id so the choice is stable across processes.
pub fn active_schedule<'a>(
    schedules: &'a [OnCallSchedule],
    at: DateTime<Utc>,
) -> Option<&'a OnCallSchedule> {
    schedules
        .iter()
        .filter(|s| s.enabled() && s.covers(at))
        .fold(None, |best: Option<&OnCallSchedule>, candidate| match best {
            None => Some(candidate),
            Some(current) => {
                if candidate.priority() > current.priority()
                    || (candidate.priority() == current.priority()
                        && candidate.id() < current.id())
                {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        })
}
