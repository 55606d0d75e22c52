use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};

/// Liveness verdict for one instance, recomputed from scratch every cycle.
#[derive(Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InstanceStatus {
    Alive,
    Dead,
    Starting,
    #[default]
    Unknown,
}

impl InstanceStatus {
    pub fn is_alive(&self) -> bool {
        matches!(self, InstanceStatus::Alive)
    }
}

/// Marks a resource reading that could not be taken (e.g. permission denied).
pub const USAGE_INACCESSIBLE: f64 = -1.0;

/// Marks a counter that does not apply to the instance (e.g. no cycle completed yet).
pub const NOT_APPLICABLE: i64 = -1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    #[test]
    fn status_names_are_lowercase() {
        assert_eq!(InstanceStatus::Starting.to_string(), "starting");
        assert_eq!(InstanceStatus::from_str("dead").unwrap(), InstanceStatus::Dead);
        assert_eq!(serde_json::to_string(&InstanceStatus::Alive).unwrap(), "\"alive\"");
    }

    #[test]
    fn only_alive_counts_as_alive() {
        use strum::IntoEnumIterator as _;
        let alive: Vec<_> = InstanceStatus::iter().filter(|s| s.is_alive()).collect();
        assert_eq!(alive, vec![InstanceStatus::Alive]);
    }
}
