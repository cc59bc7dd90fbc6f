use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Calculation, Operation};

/// Aggregate statistics over the current user's calculations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_calculations: u64,
    /// Keyed by wire operation name
    #[serde(default)]
    pub calculations_by_operation: BTreeMap<String, u64>,
    #[serde(default)]
    pub average_result: f64,
    #[serde(default)]
    pub most_used_operation: Option<String>,
    #[serde(default)]
    pub recent_calculations: Vec<Calculation>,
}

impl UserStatistics {
    /// Average formatted to two decimals
    pub fn average_display(&self) -> String {
        format!("{:.2}", self.average_result)
    }

    /// Display name of the most used operation, or `-`
    pub fn most_used_display(&self) -> String {
        self.most_used_operation
            .as_deref()
            .map(Operation::name_for)
            .unwrap_or_else(|| "-".to_string())
    }

    /// (display name, count) pairs in the order the server keys sort
    pub fn breakdown(&self) -> Vec<(String, u64)> {
        self.calculations_by_operation
            .iter()
            .map(|(op, count)| (Operation::name_for(op), *count))
            .collect()
    }
}
