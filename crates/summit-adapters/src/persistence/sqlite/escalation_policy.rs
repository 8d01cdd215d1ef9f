use async_trait::async_trait;
use serde_json::Value;

use summit_core::escalation::EscalationPolicy;
use summit_core::ids::CompanyId;
use summit_ports::error::PortError;
use summit_ports::outbound::EscalationPolicyRepository;

use super::trigger_map;
use super::SqliteDb;

fn encode(policy: &EscalationPolicy) -> Result<String, PortError> {
    let mut value =
        serde_json::to_value(policy).map_err(|e| PortError::Persistence(e.to_string()))?;
    if let Value::Object(obj) = &mut value {
        obj.insert(
            "trigger_conditions".into(),
            Value::Object(trigger_map::to_map(policy.trigger_conditions())),
        );
    }
    serde_json::to_string(&value).map_err(|e| PortError::Persistence(e.to_string()))
}

fn decode(data: &str) -> Result<EscalationPolicy, PortError> {
    let mut value: Value =
        serde_json::from_str(data).map_err(|e| PortError::Persistence(e.to_string()))?;
    if let Value::Object(obj) = &mut value {
        let conditions = match obj.get("trigger_conditions") {
            Some(Value::Object(map)) => trigger_map::from_map(map),
            _ => vec![],
        };
        obj.insert(
            "trigger_conditions".into(),
            serde_json::to_value(conditions).map_err(|e| PortError::Persistence(e.to_string()))?,
        );
    }
    serde_json::from_value(value).map_err(|e| PortError::Persistence(e.to_string()))
}

#[async_trait]
impl EscalationPolicyRepository for SqliteDb {
    async fn save(&self, policy: &EscalationPolicy) -> Result<(), PortError> {
        let id = policy.id().to_string();
        let company_id = policy.company_id().to_string();
        let data = encode(policy)?;

        sqlx::query(
            "INSERT INTO escalation_policies (id, company_id, enabled, data)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                company_id = excluded.company_id,
                enabled = excluded.enabled,
                data = excluded.data",
        )
        .bind(&id)
        .bind(&company_id)
        .bind(policy.enabled() as i64)
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_by_company(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<EscalationPolicy>, PortError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT data FROM escalation_policies WHERE company_id = ? ORDER BY rowid ASC",
        )
        .bind(company.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        rows.iter().map(|(data,)| decode(data)).collect()
    }

    async fn find_enabled_by_company(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<EscalationPolicy>, PortError> {
        // rowid ordering keeps policy evaluation order stable across sweeps.
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT data FROM escalation_policies
             WHERE company_id = ? AND enabled = 1
             ORDER BY rowid ASC",
        )
        .bind(company.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        rows.iter().map(|(data,)| decode(data)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use summit_core::escalation::{EscalationLevel, SlaBreachAction, TriggerCondition};
    use summit_core::user::Role;

    async fn db() -> SqliteDb {
        SqliteDb::new("sqlite::memory:").await.unwrap()
    }

    fn make_policy(company: &CompanyId) -> EscalationPolicy {
        EscalationPolicy::new(
            company.clone(),
            "gold tier".into(),
            vec![
                TriggerCondition::UnacknowledgedMinutes(30),
                TriggerCondition::PriorityMin(80),
            ],
            vec![EscalationLevel::new(1, 15, vec![Role::Technician], vec![]).unwrap()],
            SlaBreachAction::Escalate,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_and_find_by_company() {
        let db = db().await;
        let company = CompanyId::new();
        let policy = make_policy(&company);
        db.save(&policy).await.unwrap();

        let found = db.find_by_company(&company).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "gold tier");
        assert_eq!(
            found[0].trigger_conditions(),
            policy.trigger_conditions()
        );
    }

    #[tokio::test]
    async fn disabled_policies_filtered_from_enabled_query() {
        let db = db().await;
        let company = CompanyId::new();
        let mut policy = make_policy(&company);
        db.save(&policy).await.unwrap();
        policy.disable();
        db.save(&policy).await.unwrap();

        assert!(db.find_enabled_by_company(&company).await.unwrap().is_empty());
        assert_eq!(db.find_by_company(&company).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stored_form_is_an_open_map() {
        let db = db().await;
        let company = CompanyId::new();
        let policy = make_policy(&company);
        db.save(&policy).await.unwrap();

        let (data,): (String,) = sqlx::query_as("SELECT data FROM escalation_policies")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&data).unwrap();
        assert_eq!(
            value["trigger_conditions"]["unacknowledged_minutes"],
            Value::from(30)
        );
        assert_eq!(value["trigger_conditions"]["priority_min"], Value::from(80));
    }

    #[tokio::test]
    async fn unknown_trigger_keys_survive_loading() {
        let db = db().await;
        let company = CompanyId::new();
        let policy = make_policy(&company);
        db.save(&policy).await.unwrap();

        // Simulate a record written by a newer build with an extra trigger.
        sqlx::query(
            "UPDATE escalation_policies
             SET data = json_set(data, '$.trigger_conditions.flux_capacitor', 88)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let found = db.find_by_company(&company).await.unwrap();
        assert_eq!(found[0].trigger_conditions().len(), 2);
    }
}
