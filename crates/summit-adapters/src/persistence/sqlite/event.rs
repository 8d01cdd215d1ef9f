use async_trait::async_trait;

use summit_core::events::DomainEvent;
use summit_ports::error::PortError;
use summit_ports::outbound::EventPublisher;

use super::SqliteDb;

/// Append-only outbox. Downstream consumers (ticketing sync, client
/// notifications) read from the events table; the engine only appends.
#[async_trait]
impl EventPublisher for SqliteDb {
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), PortError> {
        for event in &events {
            let data = serde_json::to_string(event)
                .map_err(|e| PortError::Persistence(e.to_string()))?;

            sqlx::query(
                "INSERT INTO events (event_type, data, occurred_at) VALUES (?, ?, ?)",
            )
            .bind(event.event_type())
            .bind(&data)
            .bind(event.occurred_at().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use summit_core::events::IncidentEscalated;
    use summit_core::ids::{CompanyId, IncidentId, UserId};

    fn ts(s: &str) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::parse_from_rfc3339(s)
            .unwrap()
            .with_timezone(&chrono::Utc)
    }

    #[tokio::test]
    async fn publish_appends_rows_in_order() {
        let db = SqliteDb::new("sqlite::memory:").await.unwrap();
        let event = DomainEvent::IncidentEscalated(IncidentEscalated {
            incident_id: IncidentId::new(),
            company_id: CompanyId::new(),
            level: 1,
            target: UserId::new(),
            reason: "SLA breach detected".into(),
            occurred_at: ts("2025-03-10T09:00:00Z"),
        });

        db.publish(vec![event.clone(), event]).await.unwrap();

        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT event_type FROM events ORDER BY id ASC")
                .fetch_all(db.pool())
                .await
                .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|(t,)| t == "incident.escalated"));
    }

    #[tokio::test]
    async fn publish_empty_is_a_no_op() {
        let db = SqliteDb::new("sqlite::memory:").await.unwrap();
        db.publish(vec![]).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
