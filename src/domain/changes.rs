// src/domain/changes.rs

use crate::domain::category::Classifier;
use crate::domain::snapshot::PropertyData;
use serde::Serialize;
use std::collections::BTreeSet;

/// A single difference between two consecutive snapshots of one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeRecord {
    /// The headline listing count moved.
    Count {
        property: String,
        previous: u32,
        current: u32,
    },
    /// One move-in bucket moved. A bucket missing on either side counts as 0.
    MoveIn {
        property: String,
        key: String,
        previous: u32,
        current: u32,
        is_flagged: bool,
    },
}

impl ChangeRecord {
    /// Display name of the property this change belongs to.
    pub fn property(&self) -> &str {
        match self {
            ChangeRecord::Count { property, .. } | ChangeRecord::MoveIn { property, .. } => property,
        }
    }

    pub fn delta(&self) -> i64 {
        match self {
            ChangeRecord::Count { previous, current, .. }
            | ChangeRecord::MoveIn { previous, current, .. } => {
                i64::from(*current) - i64::from(*previous)
            }
        }
    }

    pub fn is_flagged(&self) -> bool {
        matches!(self, ChangeRecord::MoveIn { is_flagged: true, .. })
    }

    /// e.g. "物件数: 3件 → 5件 (2件増加)"
    pub fn message(&self) -> String {
        let (label, previous, current) = match self {
            ChangeRecord::Count { previous, current, .. } => ("物件数", previous, current),
            ChangeRecord::MoveIn { key, previous, current, .. } => (key.as_str(), previous, current),
        };
        let delta = self.delta();
        let direction = if delta > 0 { "増加" } else { "減少" };
        format!(
            "{label}: {previous}件 → {current}件 ({}件{direction})",
            delta.unsigned_abs()
        )
    }
}

/// Diffs `current` against `previous`, pairing properties by id.
///
/// Returns `None` when there is nothing to compare against or nothing
/// changed. Properties seen on only one side are ignored. Records follow the
/// order of `current`; per property the count change comes first, then the
/// move-in changes in key order.
pub fn detect_changes(
    current: &[PropertyData],
    previous: Option<&[PropertyData]>,
    classifier: &Classifier,
) -> Option<Vec<ChangeRecord>> {
    let previous = previous.filter(|p| !p.is_empty())?;

    let mut changes = Vec::new();

    for now in current {
        let Some(before) = previous.iter().find(|p| p.id == now.id) else {
            continue;
        };

        if now.count != before.count {
            changes.push(ChangeRecord::Count {
                property: now.name.clone(),
                previous: before.count,
                current: now.count,
            });
        }

        let keys: BTreeSet<&String> = now
            .move_in_breakdown
            .keys()
            .chain(before.move_in_breakdown.keys())
            .collect();

        for key in keys {
            let current_count = now.move_in_breakdown.get(key).copied().unwrap_or(0);
            let previous_count = before.move_in_breakdown.get(key).copied().unwrap_or(0);

            if current_count != previous_count {
                changes.push(ChangeRecord::MoveIn {
                    property: now.name.clone(),
                    key: key.clone(),
                    previous: previous_count,
                    current: current_count,
                    is_flagged: classifier.is_flagged(key),
                });
            }
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes)
    }
}

pub fn has_flagged_change(changes: Option<&[ChangeRecord]>) -> bool {
    changes.is_some_and(|c| c.iter().any(ChangeRecord::is_flagged))
}
