use async_trait::async_trait;

use summit_core::ids::{CompanyId, IncidentId};
use summit_core::sla::{SlaPolicy, SlaTracking};
use summit_ports::error::PortError;
use summit_ports::inbound::SlaReader;
use summit_ports::outbound::{SlaPolicyRepository, SlaTrackingRepository};

use crate::error::AppError;

/// Read pass-through over the SLA records. Breach detection itself lives in
/// the incident-update path; this service only exposes the bookkeeping.
pub struct SlaService<P, T>
where
    P: SlaPolicyRepository,
    T: SlaTrackingRepository,
{
    policies: P,
    tracking: T,
}

impl<P, T> SlaService<P, T>
where
    P: SlaPolicyRepository,
    T: SlaTrackingRepository,
{
    pub fn new(policies: P, tracking: T) -> Self {
        Self { policies, tracking }
    }

    pub async fn policies_for_company(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<SlaPolicy>, AppError> {
        Ok(self.policies.find_by_company(company).await?)
    }

    pub async fn tracking_for_incident(
        &self,
        incident: &IncidentId,
    ) -> Result<Option<SlaTracking>, AppError> {
        Ok(self.tracking.find_by_incident(incident).await?)
    }
}

#[async_trait]
impl<P, T> SlaReader for SlaService<P, T>
where
    P: SlaPolicyRepository,
    T: SlaTrackingRepository,
{
    async fn tracking_for_incident(
        &self,
        incident: &IncidentId,
    ) -> Result<Option<SlaTracking>, PortError> {
        SlaService::tracking_for_incident(self, incident)
            .await
            .map_err(|err| match err {
                AppError::Port(port) => port,
                other => PortError::Persistence(other.to_string()),
            })
    }
}
