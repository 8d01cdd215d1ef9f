//! Wire format for trigger conditions.
//!
//! Stored policies keep their trigger conditions as one open JSON object
//! (`{"unacknowledged_minutes": 30, "priority_min": 80, "sla_breached":
//! true}`) so older records with keys this build does not know are loaded
//! with the unknown keys skipped instead of rejected. The domain only ever
//! sees the closed tagged enum.

use serde_json::{Map, Value};

use summit_core::escalation::TriggerCondition;

pub fn to_map(conditions: &[TriggerCondition]) -> Map<String, Value> {
    let mut map = Map::new();
    for condition in conditions {
        match condition {
            TriggerCondition::UnacknowledgedMinutes(minutes) => {
                map.insert("unacknowledged_minutes".into(), Value::from(*minutes));
            }
            TriggerCondition::PriorityMin(score) => {
                map.insert("priority_min".into(), Value::from(*score));
            }
            TriggerCondition::SlaBreached => {
                map.insert("sla_breached".into(), Value::Bool(true));
            }
        }
    }
    map
}

pub fn from_map(map: &Map<String, Value>) -> Vec<TriggerCondition> {
    let mut conditions = vec![];
    if let Some(minutes) = map.get("unacknowledged_minutes").and_then(Value::as_i64) {
        conditions.push(TriggerCondition::UnacknowledgedMinutes(minutes));
    }
    if let Some(score) = map.get("priority_min").and_then(Value::as_u64) {
        conditions.push(TriggerCondition::PriorityMin(score as u32));
    }
    if map.get("sla_breached").and_then(Value::as_bool) == Some(true) {
        conditions.push(TriggerCondition::SlaBreached);
    }
    conditions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_conditions() {
        let conditions = vec![
            TriggerCondition::UnacknowledgedMinutes(30),
            TriggerCondition::PriorityMin(80),
            TriggerCondition::SlaBreached,
        ];
        assert_eq!(from_map(&to_map(&conditions)), conditions);
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let mut map = Map::new();
        map.insert("priority_min".into(), Value::from(70));
        map.insert("pager_storm_threshold".into(), Value::from(9000));

        assert_eq!(from_map(&map), vec![TriggerCondition::PriorityMin(70)]);
    }

    #[test]
    fn sla_breached_false_is_absent() {
        let mut map = Map::new();
        map.insert("sla_breached".into(), Value::Bool(false));
        assert!(from_map(&map).is_empty());
    }
}
