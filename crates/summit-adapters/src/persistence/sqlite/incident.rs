use async_trait::async_trait;

use summit_core::ids::IncidentId;
use summit_core::incident::Incident;
use summit_ports::error::PortError;
use summit_ports::outbound::IncidentRepository;

use super::SqliteDb;

#[async_trait]
impl IncidentRepository for SqliteDb {
    async fn save(&self, incident: &Incident) -> Result<(), PortError> {
        let id = incident.id().to_string();
        let company_id = incident.company_id().to_string();
        let status = incident.status().as_str();
        let data =
            serde_json::to_string(incident).map_err(|e| PortError::Persistence(e.to_string()))?;
        let created_at = incident.created_at().to_rfc3339();

        sqlx::query(
            "INSERT INTO incidents (id, company_id, status, priority_score, data, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                company_id = excluded.company_id,
                status = excluded.status,
                priority_score = excluded.priority_score,
                data = excluded.data",
        )
        .bind(&id)
        .bind(&company_id)
        .bind(status)
        .bind(incident.priority_score() as i64)
        .bind(&data)
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &IncidentId) -> Result<Option<Incident>, PortError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM incidents WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        match row {
            Some((data,)) => {
                let incident: Incident = serde_json::from_str(&data)
                    .map_err(|e| PortError::Persistence(e.to_string()))?;
                Ok(Some(incident))
            }
            None => Ok(None),
        }
    }

    async fn find_open(&self) -> Result<Vec<Incident>, PortError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT data FROM incidents
             WHERE status IN ('new', 'in_progress')
             ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        let mut incidents = Vec::with_capacity(rows.len());
        for (data,) in rows {
            let incident: Incident =
                serde_json::from_str(&data).map_err(|e| PortError::Persistence(e.to_string()))?;
            incidents.push(incident);
        }
        Ok(incidents)
    }
}
