use async_trait::async_trait;

use summit_core::ids::{CompanyId, IncidentId};
use summit_core::sla::{SlaPolicy, SlaTracking};
use summit_ports::error::PortError;
use summit_ports::outbound::{SlaPolicyRepository, SlaTrackingRepository};

use super::SqliteDb;

#[async_trait]
impl SlaPolicyRepository for SqliteDb {
    async fn save(&self, policy: &SlaPolicy) -> Result<(), PortError> {
        let data =
            serde_json::to_string(policy).map_err(|e| PortError::Persistence(e.to_string()))?;

        sqlx::query(
            "INSERT INTO sla_policies (id, company_id, data)
             VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                company_id = excluded.company_id,
                data = excluded.data",
        )
        .bind(policy.id().to_string())
        .bind(policy.company_id().to_string())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_by_company(&self, company: &CompanyId) -> Result<Vec<SlaPolicy>, PortError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT data FROM sla_policies WHERE company_id = ? ORDER BY rowid ASC")
                .bind(company.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PortError::Persistence(e.to_string()))?;

        rows.iter()
            .map(|(data,)| {
                serde_json::from_str(data).map_err(|e| PortError::Persistence(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl SlaTrackingRepository for SqliteDb {
    async fn save(&self, tracking: &SlaTracking) -> Result<(), PortError> {
        let data =
            serde_json::to_string(tracking).map_err(|e| PortError::Persistence(e.to_string()))?;

        sqlx::query(
            "INSERT INTO sla_tracking (id, incident_id, data)
             VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                incident_id = excluded.incident_id,
                data = excluded.data",
        )
        .bind(tracking.id().to_string())
        .bind(tracking.incident_id().to_string())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_by_incident(
        &self,
        incident: &IncidentId,
    ) -> Result<Option<SlaTracking>, PortError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT data FROM sla_tracking WHERE incident_id = ?")
                .bind(incident.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PortError::Persistence(e.to_string()))?;

        match row {
            Some((data,)) => {
                let tracking: SlaTracking = serde_json::from_str(&data)
                    .map_err(|e| PortError::Persistence(e.to_string()))?;
                Ok(Some(tracking))
            }
            None => Ok(None),
        }
    }
}
