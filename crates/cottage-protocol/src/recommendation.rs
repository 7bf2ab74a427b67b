//! Maintenance recommendation records.

use serde::{Deserialize, Serialize};

/// Derived grouping of labels by how urgently they need work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Normal,
    Minor,
    Moderate,
    Severe,
}

impl SeverityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            SeverityTier::Normal => "normal",
            SeverityTier::Minor => "minor",
            SeverityTier::Moderate => "moderate",
            SeverityTier::Severe => "severe",
        }
    }
}

/// Full guidance for one class label: what it means, what it costs, and how
/// to fix it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub status: String,
    pub urgency: String,
    pub summary: String,
    pub action: String,
    pub estimated_cost: String,
    pub timeframe: String,
    pub diy_possible: bool,
    pub referral_needed: bool,
    pub referral_type: Option<String>,
    pub materials: Vec<String>,
    pub tools: Vec<String>,
    pub steps: Vec<String>,
}
