pub mod record;
pub mod trigger;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CompanyId, PolicyId, UserId};
use crate::user::Role;

pub use record::IncidentEscalation;
pub use trigger::{first_matching_reason, EscalationReason, TriggerCondition};

/// What the platform does when an SLA breach fires beyond escalating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaBreachAction {
    Escalate,
    NotifyOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationLevel {
    level: u32,
    delay_minutes: u32,
    notify_roles: Vec<Role>,
    target_users: Vec<UserId>,
}

impl EscalationLevel {
    pub fn new(
        level: u32,
        delay_minutes: u32,
        notify_roles: Vec<Role>,
        target_users: Vec<UserId>,
    ) -> Result<Self, DomainError> {
        if notify_roles.is_empty() && target_users.is_empty() {
            return Err(DomainError::LevelRequiresTarget);
        }
        Ok(Self {
            level,
            delay_minutes,
            notify_roles,
            target_users,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn delay_minutes(&self) -> u32 {
        self.delay_minutes
    }

    pub fn notify_roles(&self) -> &[Role] {
        &self.notify_roles
    }

    pub fn target_users(&self) -> &[UserId] {
        &self.target_users
    }
}

/// Per-company escalation configuration. Read-only to the engine;
/// only administrative configuration mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationPolicy {
    id: PolicyId,
    company_id: CompanyId,
    name: String,
    enabled: bool,
    trigger_conditions: Vec<TriggerCondition>,
    levels: Vec<EscalationLevel>,
    sla_breach_action: SlaBreachAction,
}

impl EscalationPolicy {
    pub fn new(
        company_id: CompanyId,
        name: String,
        trigger_conditions: Vec<TriggerCondition>,
        levels: Vec<EscalationLevel>,
        sla_breach_action: SlaBreachAction,
    ) -> Result<Self, DomainError> {
        if levels.is_empty() {
            return Err(DomainError::PolicyRequiresLevel);
        }
        Ok(Self {
            id: PolicyId::new(),
            company_id,
            name,
            enabled: true,
            trigger_conditions,
            levels,
            sla_breach_action,
        })
    }

    /// Level configuration for a 1-based escalation level. Requests past
    /// the last configured level clamp to the highest one.
    pub fn level_for(&self, requested: u32) -> &EscalationLevel {
        self.levels
            .iter()
            .find(|l| l.level == requested)
            .unwrap_or_else(|| {
                self.levels
                    .iter()
                    .max_by_key(|l| l.level)
                    .expect("policy has at least one level")
            })
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn id(&self) -> &PolicyId {
        &self.id
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn trigger_conditions(&self) -> &[TriggerCondition] {
        &self.trigger_conditions
    }

    pub fn levels(&self) -> &[EscalationLevel] {
        &self.levels
    }

    pub fn sla_breach_action(&self) -> SlaBreachAction {
        self.sla_breach_action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(n: u32, roles: Vec<Role>, users: Vec<UserId>) -> EscalationLevel {
        EscalationLevel::new(n, 15, roles, users).unwrap()
    }

    fn make_policy(levels: Vec<EscalationLevel>) -> EscalationPolicy {
        EscalationPolicy::new(
            CompanyId::new(),
            "default".into(),
            vec![TriggerCondition::PriorityMin(80)],
            levels,
            SlaBreachAction::Escalate,
        )
        .unwrap()
    }

    #[test]
    fn policy_requires_at_least_one_level() {
        let result = EscalationPolicy::new(
            CompanyId::new(),
            "empty".into(),
            vec![],
            vec![],
            SlaBreachAction::Escalate,
        );
        assert!(matches!(result, Err(DomainError::PolicyRequiresLevel)));
    }

    #[test]
    fn level_requires_role_or_user() {
        let result = EscalationLevel::new(1, 0, vec![], vec![]);
        assert!(matches!(result, Err(DomainError::LevelRequiresTarget)));
    }

    #[test]
    fn new_policy_starts_enabled() {
        let policy = make_policy(vec![level(1, vec![Role::Technician], vec![])]);
        assert!(policy.enabled());
    }

    #[test]
    fn level_for_exact_match() {
        let policy = make_policy(vec![
            level(1, vec![Role::Technician], vec![]),
            level(2, vec![Role::Dispatcher], vec![]),
        ]);
        assert_eq!(policy.level_for(2).level(), 2);
    }

    #[test]
    fn level_past_configured_clamps_to_highest() {
        let policy = make_policy(vec![
            level(1, vec![Role::Technician], vec![]),
            level(2, vec![Role::Dispatcher], vec![]),
        ]);
        assert_eq!(policy.level_for(7).level(), 2);
    }

    #[test]
    fn level_with_explicit_users_keeps_order() {
        let first = UserId::new();
        let second = UserId::new();
        let policy = make_policy(vec![level(
            1,
            vec![],
            vec![first.clone(), second],
        )]);
        assert_eq!(policy.level_for(1).target_users()[0], first);
    }
}
