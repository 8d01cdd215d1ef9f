use async_trait::async_trait;
use chrono::{DateTime, Utc};

use summit_core::ids::{CompanyId, UserId};
use summit_core::schedule::active_schedule;
use summit_ports::error::PortError;
use summit_ports::inbound::OnCallManager;
use summit_ports::outbound::{ScheduleRepository, UserRepository};
use summit_ports::types::{OnCallResolution, ScheduleEntry};

use crate::error::AppError;

/// Resolves who is on duty from the company's on-call schedules.
pub struct OnCallService<S, U>
where
    S: ScheduleRepository,
    U: UserRepository,
{
    schedules: S,
    users: U,
}

impl<S, U> OnCallService<S, U>
where
    S: ScheduleRepository,
    U: UserRepository,
{
    pub fn new(schedules: S, users: U) -> Self {
        Self { schedules, users }
    }

    /// The technician on duty at `at`, or None when no enabled schedule
    /// covers the instant. Overlaps resolve to the highest priority;
    /// equal priorities break toward the lowest schedule id.
    pub async fn current_on_call(
        &self,
        company: &CompanyId,
        at: DateTime<Utc>,
    ) -> Result<Option<OnCallResolution>, AppError> {
        let schedules = self.schedules.find_by_company(company).await?;
        let Some(matched) = active_schedule(&schedules, at) else {
            return Ok(None);
        };

        let user = self
            .users
            .find_by_id(matched.technician_id())
            .await?
            .ok_or(PortError::NotFound)?;

        Ok(Some(OnCallResolution {
            user,
            schedule_id: matched.id().clone(),
            schedule_name: matched.name().to_string(),
        }))
    }

    /// Concrete shift windows within `[start, end)` for calendar views,
    /// sorted by window start.
    pub async fn schedule_for_range(
        &self,
        company: &CompanyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScheduleEntry>, AppError> {
        let schedules = self.schedules.find_by_company(company).await?;
        let mut entries = vec![];
        for schedule in schedules.iter().filter(|s| s.enabled()) {
            for (window_start, window_end) in schedule.occurrences_within(start, end) {
                entries.push(ScheduleEntry {
                    schedule_id: schedule.id().clone(),
                    schedule_name: schedule.name().to_string(),
                    technician_id: schedule.technician_id().clone(),
                    start: window_start,
                    end: window_end,
                });
            }
        }
        entries.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.schedule_id.cmp(&b.schedule_id))
        });
        Ok(entries)
    }

    /// Whether any of the technician's schedules produce a window
    /// overlapping `[start, end)`. Used by schedule editors before saving.
    pub async fn has_conflict(
        &self,
        technician: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let schedules = self.schedules.find_by_technician(technician).await?;
        Ok(schedules
            .iter()
            .filter(|s| s.enabled())
            .any(|s| s.conflicts_with(start, end)))
    }
}

#[async_trait]
impl<S, U> OnCallManager for OnCallService<S, U>
where
    S: ScheduleRepository,
    U: UserRepository,
{
    async fn current_on_call(
        &self,
        company: &CompanyId,
        at: DateTime<Utc>,
    ) -> Result<Option<OnCallResolution>, PortError> {
        OnCallService::current_on_call(self, company, at)
            .await
            .map_err(app_to_port)
    }

    async fn schedule_for_range(
        &self,
        company: &CompanyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScheduleEntry>, PortError> {
        OnCallService::schedule_for_range(self, company, start, end)
            .await
            .map_err(app_to_port)
    }

    async fn has_conflict(
        &self,
        technician: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, PortError> {
        OnCallService::has_conflict(self, technician, start, end)
            .await
            .map_err(app_to_port)
    }
}

fn app_to_port(err: AppError) -> PortError {
    match err {
        AppError::Port(port) => port,
        other => PortError::Persistence(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Weekday};
    use std::sync::Mutex;
    use summit_core::schedule::{OnCallSchedule, ScheduleKind};
    use summit_core::user::{Role, User};

    #[derive(Default)]
    struct MockScheduleRepo {
        schedules: Mutex<Vec<OnCallSchedule>>,
    }

    #[async_trait]
    impl ScheduleRepository for MockScheduleRepo {
        async fn save(&self, schedule: &OnCallSchedule) -> Result<(), PortError> {
            self.schedules.lock().unwrap().push(schedule.clone());
            Ok(())
        }
        async fn find_by_company(
            &self,
            company: &CompanyId,
        ) -> Result<Vec<OnCallSchedule>, PortError> {
            Ok(self
                .schedules
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.company_id() == company)
                .cloned()
                .collect())
        }
        async fn find_by_technician(
            &self,
            technician: &UserId,
        ) -> Result<Vec<OnCallSchedule>, PortError> {
            Ok(self
                .schedules
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.technician_id() == technician)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct MockUserRepo {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepository for MockUserRepo {
        async fn save(&self, user: &User) -> Result<(), PortError> {
            self.users.lock().unwrap().push(user.clone());
            Ok(())
        }
        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PortError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id() == id)
                .cloned())
        }
        async fn find_by_company_and_role(
            &self,
            company: &CompanyId,
            role: Role,
        ) -> Result<Vec<User>, PortError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.belongs_to(company) && u.role() == role)
                .cloned()
                .collect())
        }
    }

    fn ts(s: &str) -> DateTime<Utc> {
        chrono::DateTime::parse_from_rfc3339(s)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn tod(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn make_service() -> OnCallService<MockScheduleRepo, MockUserRepo> {
        OnCallService::new(MockScheduleRepo::default(), MockUserRepo::default())
    }

    async fn seed_technician(svc: &OnCallService<MockScheduleRepo, MockUserRepo>, company: &CompanyId) -> User {
        let user = User::new(
            "alice".into(),
            "alice@msp.test".into(),
            Role::Technician,
            Some(company.clone()),
        );
        svc.users.save(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn one_time_override_beats_weekly_inside_window() {
        // 2025-03-10 is a Monday.
        let svc = make_service();
        let company = CompanyId::new();
        let weekly_tech = seed_technician(&svc, &company).await;
        let override_tech = seed_technician(&svc, &company).await;

        let weekly = OnCallSchedule::new(
            company.clone(),
            weekly_tech.id().clone(),
            "weekday shift".into(),
            ScheduleKind::Weekly {
                days: vec![Weekday::Mon],
                start: tod(9, 0),
                end: tod(17, 0),
            },
            1,
        )
        .unwrap();
        let override_shift = OnCallSchedule::new(
            company.clone(),
            override_tech.id().clone(),
            "maintenance cover".into(),
            ScheduleKind::OneTime {
                start: ts("2025-03-10T10:00:00Z"),
                end: ts("2025-03-10T11:00:00Z"),
            },
            5,
        )
        .unwrap();
        svc.schedules.save(&weekly).await.unwrap();
        svc.schedules.save(&override_shift).await.unwrap();

        let during = svc
            .current_on_call(&company, ts("2025-03-10T10:30:00Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(during.user.id(), override_tech.id());
        assert_eq!(during.schedule_name, "maintenance cover");

        let before = svc
            .current_on_call(&company, ts("2025-03-10T09:30:00Z"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.user.id(), weekly_tech.id());
        assert_eq!(&before.schedule_id, weekly.id());
    }

    #[tokio::test]
    async fn no_covering_schedule_returns_none() {
        let svc = make_service();
        let company = CompanyId::new();
        let tech = seed_technician(&svc, &company).await;

        let weekly = OnCallSchedule::new(
            company.clone(),
            tech.id().clone(),
            "weekday shift".into(),
            ScheduleKind::Weekly {
                days: vec![Weekday::Mon],
                start: tod(9, 0),
                end: tod(17, 0),
            },
            1,
        )
        .unwrap();
        svc.schedules.save(&weekly).await.unwrap();

        // Sunday
        let result = svc
            .current_on_call(&company, ts("2025-03-09T10:00:00Z"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn schedules_of_other_companies_are_ignored() {
        let svc = make_service();
        let company = CompanyId::new();
        let other_company = CompanyId::new();
        let tech = seed_technician(&svc, &other_company).await;

        let daily = OnCallSchedule::new(
            other_company,
            tech.id().clone(),
            "other msp".into(),
            ScheduleKind::Daily {
                start: tod(0, 0),
                end: tod(23, 59),
            },
            1,
        )
        .unwrap();
        svc.schedules.save(&daily).await.unwrap();

        let result = svc
            .current_on_call(&company, ts("2025-03-10T10:00:00Z"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn range_expansion_lists_windows_in_order() {
        let svc = make_service();
        let company = CompanyId::new();
        let tech = seed_technician(&svc, &company).await;

        let daily = OnCallSchedule::new(
            company.clone(),
            tech.id().clone(),
            "day shift".into(),
            ScheduleKind::Daily {
                start: tod(9, 0),
                end: tod(17, 0),
            },
            1,
        )
        .unwrap();
        svc.schedules.save(&daily).await.unwrap();

        let entries = svc
            .schedule_for_range(
                &company,
                ts("2025-03-10T00:00:00Z"),
                ts("2025-03-13T00:00:00Z"),
            )
            .await
            .unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.windows(2).all(|w| w[0].start <= w[1].start));
        assert_eq!(entries[0].technician_id, *tech.id());
    }

    #[tokio::test]
    async fn conflict_check_follows_kind_rules() {
        let svc = make_service();
        let company = CompanyId::new();
        let tech = seed_technician(&svc, &company).await;

        let weekly = OnCallSchedule::new(
            company.clone(),
            tech.id().clone(),
            "monday shift".into(),
            ScheduleKind::Weekly {
                days: vec![Weekday::Mon],
                start: tod(9, 0),
                end: tod(17, 0),
            },
            1,
        )
        .unwrap();
        svc.schedules.save(&weekly).await.unwrap();

        // Monday morning overlaps.
        assert!(svc
            .has_conflict(tech.id(), ts("2025-03-10T10:00:00Z"), ts("2025-03-10T12:00:00Z"))
            .await
            .unwrap());
        // Tuesday does not.
        assert!(!svc
            .has_conflict(tech.id(), ts("2025-03-11T10:00:00Z"), ts("2025-03-11T12:00:00Z"))
            .await
            .unwrap());
    }
}
