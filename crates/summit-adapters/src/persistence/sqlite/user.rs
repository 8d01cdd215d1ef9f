use async_trait::async_trait;

use summit_core::ids::{CompanyId, UserId};
use summit_core::user::{Role, User};
use summit_ports::error::PortError;
use summit_ports::outbound::UserRepository;

use super::SqliteDb;

#[async_trait]
impl UserRepository for SqliteDb {
    async fn save(&self, user: &User) -> Result<(), PortError> {
        let data =
            serde_json::to_string(user).map_err(|e| PortError::Persistence(e.to_string()))?;
        let company_id = user.company_id().map(ToString::to_string);

        sqlx::query(
            "INSERT INTO users (id, company_id, role, data)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                company_id = excluded.company_id,
                role = excluded.role,
                data = excluded.data",
        )
        .bind(user.id().to_string())
        .bind(company_id)
        .bind(user.role().as_str())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PortError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        match row {
            Some((data,)) => {
                let user: User = serde_json::from_str(&data)
                    .map_err(|e| PortError::Persistence(e.to_string()))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn find_by_company_and_role(
        &self,
        company: &CompanyId,
        role: Role,
    ) -> Result<Vec<User>, PortError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT data FROM users WHERE company_id = ? AND role = ? ORDER BY rowid ASC",
        )
        .bind(company.to_string())
        .bind(role.as_str())
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
