// src/domain/breakdown.rs

use crate::domain::category::{color_for, Classifier, IMMEDIATE, NEGOTIABLE};
use crate::domain::history::History;
use crate::domain::snapshot::PropertyData;
use serde::Serialize;
use std::collections::BTreeSet;

/// Listings carrying exactly `category` across all properties.
pub fn total_for_category(properties: &[PropertyData], category: &str) -> u32 {
    properties
        .iter()
        .map(|p| p.move_in_breakdown.get(category).copied().unwrap_or(0))
        .sum()
}

/// Listings under any flagged label, with or without a period suffix.
pub fn total_flagged(properties: &[PropertyData], classifier: &Classifier) -> u32 {
    properties
        .iter()
        .flat_map(|p| p.move_in_breakdown.iter())
        .filter(|(label, _)| classifier.is_flagged(label))
        .map(|(_, count)| *count)
        .sum()
}

pub fn grand_total(properties: &[PropertyData]) -> u32 {
    properties.iter().map(|p| p.count).sum()
}

/// One property's count at every entry; `None` where it was not recorded.
pub fn per_timestamp_series<'a>(
    history: &'a History,
    property_id: &str,
) -> Vec<(&'a str, Option<u32>)> {
    history
        .entries()
        .iter()
        .map(|entry| {
            let count = entry
                .properties
                .iter()
                .find(|p| p.id == property_id)
                .map(|p| p.count);
            (entry.timestamp.as_str(), count)
        })
        .collect()
}

/// Grand total at every entry.
pub fn total_series(history: &History) -> Vec<(&str, u32)> {
    history
        .entries()
        .iter()
        .map(|entry| (entry.timestamp.as_str(), grand_total(&entry.properties)))
        .collect()
}

/// Cross-property total of one move-in label at every entry.
pub fn category_series<'a>(history: &'a History, category: &str) -> Vec<(&'a str, u32)> {
    history
        .entries()
        .iter()
        .map(|entry| {
            (
                entry.timestamp.as_str(),
                total_for_category(&entry.properties, category),
            )
        })
        .collect()
}

/// Every label seen anywhere in `history`, in display order.
pub fn categories_in(history: &History, classifier: &Classifier) -> Vec<String> {
    let seen: BTreeSet<&str> = history
        .entries()
        .iter()
        .flat_map(|e| e.properties.iter())
        .flat_map(|p| p.move_in_breakdown.keys().map(String::as_str))
        .collect();

    let mut labels: Vec<String> = seen.into_iter().map(str::to_string).collect();
    classifier.sort_labels(&mut labels);
    labels
}

/// Headline numbers for one snapshot list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: u32,
    pub flagged: u32,
    pub immediate: u32,
    pub negotiable: u32,
}

impl Summary {
    pub fn of(properties: &[PropertyData], classifier: &Classifier) -> Self {
        Self {
            total: grand_total(properties),
            flagged: total_flagged(properties, classifier),
            immediate: total_for_category(properties, IMMEDIATE),
            negotiable: total_for_category(properties, NEGOTIABLE),
        }
    }
}

/// Chart-ready view of a (windowed) history.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSet {
    pub timestamps: Vec<String>,
    pub properties: Vec<PropertySeries>,
    pub total: Vec<u32>,
    pub categories: Vec<CategorySeries>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertySeries {
    pub id: String,
    pub name: String,
    pub counts: Vec<Option<u32>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySeries {
    pub label: String,
    pub color: &'static str,
    pub counts: Vec<u32>,
}

impl SeriesSet {
    /// Property lines follow the latest entry's property list.
    pub fn build(history: &History, classifier: &Classifier) -> Self {
        let timestamps = history
            .entries()
            .iter()
            .map(|e| e.timestamp.clone())
            .collect();

        let properties = history
            .latest()
            .map(|latest| {
                latest
                    .properties
                    .iter()
                    .map(|p| PropertySeries {
                        id: p.id.clone(),
                        name: p.name.clone(),
                        counts: per_timestamp_series(history, &p.id)
                            .into_iter()
                            .map(|(_, count)| count)
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let total = total_series(history).into_iter().map(|(_, n)| n).collect();

        let categories = categories_in(history, classifier)
            .into_iter()
            .map(|label| {
                let counts = category_series(history, &label)
                    .into_iter()
                    .map(|(_, n)| n)
                    .collect();
                CategorySeries {
                    color: color_for(&label),
                    label,
                    counts,
                }
            })
            .collect();

        Self {
            timestamps,
            properties,
            total,
            categories,
        }
    }
}
