use std::collections::BTreeMap;

use serde::Deserialize;

/// Server-computed aggregate. Breakdown keys are passed through as sent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatsSnapshot {
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub avg_tickets_per_day: f64,
    #[serde(default)]
    pub priority_breakdown: BTreeMap<String, u64>,
    #[serde(default)]
    pub category_breakdown: BTreeMap<String, u64>,
}
