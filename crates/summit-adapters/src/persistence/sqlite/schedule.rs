use async_trait::async_trait;

use summit_core::ids::{CompanyId, UserId};
use summit_core::schedule::OnCallSchedule;
use summit_ports::error::PortError;
use summit_ports::outbound::ScheduleRepository;

use super::SqliteDb;

fn decode_rows(rows: Vec<(String,)>) -> Result<Vec<OnCallSchedule>, PortError> {
    rows.iter()
        .map(|(data,)| {
            serde_json::from_str(data).map_err(|e| PortError::Persistence(e.to_string()))
        })
        .collect()
}

#[async_trait]
impl ScheduleRepository for SqliteDb {
    async fn save(&self, schedule: &OnCallSchedule) -> Result<(), PortError> {
        let data =
            serde_json::to_string(schedule).map_err(|e| PortError::Persistence(e.to_string()))?;

        sqlx::query(
            "INSERT INTO on_call_schedules (id, company_id, technician_id, enabled, data)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                company_id = excluded.company_id,
                technician_id = excluded.technician_id,
                enabled = excluded.enabled,
                data = excluded.data",
        )
        .bind(schedule.id().to_string())
        .bind(schedule.company_id().to_string())
        .bind(schedule.technician_id().to_string())
        .bind(schedule.enabled() as i64)
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_by_company(&self, company: &CompanyId) -> Result<Vec<OnCallSchedule>, PortError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT data FROM on_call_schedules WHERE company_id = ? ORDER BY rowid ASC",
        )
        .bind(company.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        decode_rows(rows)
    }

    async fn find_by_technician(
        &self,
        technician: &UserId,
    ) -> Result<Vec<OnCallSchedule>, PortError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT data FROM on_call_schedules WHERE technician_id = ? ORDER BY rowid ASC",
        )
        .bind(technician.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        decode_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use summit_core::schedule::ScheduleKind;

    async fn db() -> SqliteDb {
        SqliteDb::new("sqlite::memory:").await.unwrap()
    }

    fn tod(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn daily_shift(company: &CompanyId, technician: &UserId) -> OnCallSchedule {
        OnCallSchedule::new(
            company.clone(),
            technician.clone(),
            "day shift".into(),
            ScheduleKind::Daily {
                start: tod(9, 0),
                end: tod(17, 0),
            },
            0,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_and_find_by_company() {
        let db = db().await;
        let company = CompanyId::new();
        let technician = UserId::new();
        db.save(&daily_shift(&company, &technician)).await.unwrap();
        db.save(&daily_shift(&CompanyId::new(), &UserId::new()))
            .await
            .unwrap();

        let found = ScheduleRepository::find_by_company(&db, &company)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].technician_id(), &technician);
        assert_eq!(
            found[0].kind(),
            &ScheduleKind::Daily {
                start: tod(9, 0),
                end: tod(17, 0),
            }
        );
    }

    #[tokio::test]
    async fn find_by_technician_spans_companies() {
        let db = db().await;
        let technician = UserId::new();
        db.save(&daily_shift(&CompanyId::new(), &technician))
            .await
            .unwrap();
        db.save(&daily_shift(&CompanyId::new(), &technician))
            .await
            .unwrap();

        let found = db.find_by_technician(&technician).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn disable_persists_through_upsert() {
        let db = db().await;
        let company = CompanyId::new();
        let mut schedule = daily_shift(&company, &UserId::new());
        db.save(&schedule).await.unwrap();

        schedule.disable();
        db.save(&schedule).await.unwrap();

        let found = ScheduleRepository::find_by_company(&db, &company)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(!found[0].enabled());
    }
}
