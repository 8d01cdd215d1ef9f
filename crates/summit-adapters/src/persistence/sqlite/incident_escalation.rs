use async_trait::async_trait;
use chrono::{DateTime, Utc};

use summit_core::escalation::IncidentEscalation;
use summit_core::ids::{EscalationId, IncidentId};
use summit_ports::error::PortError;
use summit_ports::outbound::IncidentEscalationRepository;

use super::SqliteDb;

fn map_insert_error(err: sqlx::Error) -> PortError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => PortError::Duplicate,
        _ => PortError::Persistence(err.to_string()),
    }
}

#[async_trait]
impl IncidentEscalationRepository for SqliteDb {
    async fn insert(&self, escalation: &IncidentEscalation) -> Result<(), PortError> {
        let data = serde_json::to_string(escalation)
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        // Plain INSERT: the UNIQUE index on incident_id turns a concurrent
        // second escalation into a Duplicate error instead of a second row.
        sqlx::query(
            "INSERT INTO incident_escalations
                (id, incident_id, company_id, level, data, escalated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(escalation.id().to_string())
        .bind(escalation.incident_id().to_string())
        .bind(escalation.company_id().to_string())
        .bind(escalation.level() as i64)
        .bind(&data)
        .bind(escalation.escalated_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    async fn find_by_incident(
        &self,
        incident: &IncidentId,
    ) -> Result<Vec<IncidentEscalation>, PortError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT data FROM incident_escalations WHERE incident_id = ? ORDER BY level ASC",
        )
        .bind(incident.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        rows.iter()
            .map(|(data,)| {
                serde_json::from_str(data).map_err(|e| PortError::Persistence(e.to_string()))
            })
            .collect()
    }

    async fn count_for_incident(&self, incident: &IncidentId) -> Result<u32, PortError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM incident_escalations WHERE incident_id = ?")
                .bind(incident.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| PortError::Persistence(e.to_string()))?;
        Ok(count as u32)
    }

    async fn mark_acknowledged(
        &self,
        escalation: &EscalationId,
        at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT data FROM incident_escalations WHERE id = ?")
                .bind(escalation.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PortError::Persistence(e.to_string()))?;

        let (data,) = row.ok_or(PortError::NotFound)?;
        let mut record: IncidentEscalation =
            serde_json::from_str(&data).map_err(|e| PortError::Persistence(e.to_string()))?;
        record
            .acknowledge(at)
            .map_err(|e| PortError::Persistence(e.to_string()))?;
        let data = serde_json::to_string(&record)
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        sqlx::query("UPDATE incident_escalations SET data = ? WHERE id = ?")
            .bind(&data)
            .bind(escalation.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }
}
