pub mod error;
pub mod escalation_service;
pub mod monitor;
pub mod oncall_service;
pub mod sla_service;
