pub mod error;
pub mod escalation;
pub mod events;
pub mod ids;
pub mod incident;
pub mod schedule;
pub mod severity;
pub mod sla;
pub mod user;
