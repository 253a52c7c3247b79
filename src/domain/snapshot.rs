// src/domain/snapshot.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Move-in-date label -> number of listings carrying that label.
///
/// Keys are whatever the listing page printed (e.g. "即入居可", "相談",
/// "26年3月上旬"), so the set is open-ended. Presentation order is computed
/// by the classifier, never taken from the map.
pub type MoveInBreakdown = BTreeMap<String, u32>;

/// A tracked building, as registered by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// One property's listing count and move-in breakdown from a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyData {
    pub id: String,
    pub name: String,
    pub url: String,
    pub count: u32,
    #[serde(default)]
    pub move_in_breakdown: MoveInBreakdown,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PropertyData {
    pub fn fetched(property: &Property, count: u32, move_in_breakdown: MoveInBreakdown) -> Self {
        Self {
            id: property.id.clone(),
            name: property.name.clone(),
            url: property.url.clone(),
            count,
            move_in_breakdown,
            success: true,
            error: None,
        }
    }

    /// A failed fetch always carries a zero count and an empty breakdown.
    pub fn failed(property: &Property, error: impl Into<String>) -> Self {
        Self {
            id: property.id.clone(),
            name: property.name.clone(),
            url: property.url.clone(),
            count: 0,
            move_in_breakdown: MoveInBreakdown::new(),
            success: false,
            error: Some(error.into()),
        }
    }

    /// Sum of all breakdown buckets. Can differ from `count` when some
    /// rows on the page had no parseable move-in cell.
    pub fn breakdown_total(&self) -> u32 {
        self.move_in_breakdown.values().sum()
    }
}
