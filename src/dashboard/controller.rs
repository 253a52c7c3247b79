// src/dashboard/controller.rs

use crate::domain::breakdown::{SeriesSet, Summary};
use crate::domain::category::{color_for, Category, Classifier};
use crate::domain::changes::{detect_changes, has_flagged_change, ChangeRecord};
use crate::domain::history::{History, RangeSpec};
use crate::domain::snapshot::PropertyData;
use crate::store::{BaselineCache, HistoryStore, StoreError};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Change banner shown above the property cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeAlert {
    pub lines: Vec<String>,
    /// At least one change touched the flagged month.
    pub highlight: bool,
}

impl ChangeAlert {
    pub fn from_changes(changes: &[ChangeRecord]) -> Self {
        let lines = changes
            .iter()
            .map(|c| {
                if c.is_flagged() {
                    format!("[注目] {}: {}", c.property(), c.message())
                } else {
                    format!("{}: {}", c.property(), c.message())
                }
            })
            .collect();

        Self {
            lines,
            highlight: has_flagged_change(Some(changes)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveInTag {
    pub label: String,
    pub count: u32,
    pub category: Category,
    pub color: &'static str,
}

#[derive(Debug, Clone)]
pub struct PropertyCard {
    pub name: String,
    pub url: String,
    pub count: u32,
    pub success: bool,
    pub error: Option<String>,
    pub tags: Vec<MoveInTag>,
}

impl PropertyCard {
    fn build(data: &PropertyData, classifier: &Classifier) -> Self {
        let mut tags: Vec<MoveInTag> = data
            .move_in_breakdown
            .iter()
            .map(|(label, count)| MoveInTag {
                label: label.clone(),
                count: *count,
                category: classifier.classify(label),
                color: color_for(label),
            })
            .collect();
        tags.sort_by(|a, b| classifier.compare(&a.label, &b.label));

        Self {
            name: data.name.clone(),
            url: data.url.clone(),
            count: data.count,
            success: data.success,
            error: data.error.clone(),
            tags,
        }
    }
}

/// Everything the dashboard page needs for one render.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub range: RangeSpec,
    /// `None` until the first fetch has been recorded.
    pub latest: Option<LatestView>,
    pub series: SeriesSet,
    pub flagged_label: String,
}

#[derive(Debug, Clone)]
pub struct LatestView {
    pub date: String,
    pub time: String,
    pub summary: Summary,
    pub cards: Vec<PropertyCard>,
    pub alert: Option<ChangeAlert>,
}

/// Presentation-side state: the last fetched history, the snapshot the
/// viewer last saw, and the selected chart range. Domain functions receive
/// these explicitly; nothing here is global.
pub struct DashboardController {
    classifier: Classifier,
    baseline_cache: BaselineCache,
    cached_history: History,
    baseline: Option<Vec<PropertyData>>,
    range: RangeSpec,
}

impl DashboardController {
    /// Seeds the baseline from the on-disk cache, if any.
    pub fn new(classifier: Classifier, baseline_cache: BaselineCache) -> Self {
        let baseline = baseline_cache.load();
        Self {
            classifier,
            baseline_cache,
            cached_history: History::new(),
            baseline,
            range: RangeSpec::default(),
        }
    }

    pub fn range(&self) -> RangeSpec {
        self.range
    }

    /// Re-reads the history. On failure the previous cache is kept.
    pub fn refresh(&mut self, store: &dyn HistoryStore) -> Result<&History, StoreError> {
        self.cached_history = store.load()?;
        Ok(&self.cached_history)
    }

    /// Builds a view from the cached history, diffing the latest snapshot
    /// against the viewer's baseline and then advancing the baseline.
    pub fn render(&mut self, range: Option<RangeSpec>, now: DateTime<Utc>) -> DashboardView {
        if let Some(range) = range {
            self.range = range;
        }

        let windowed = self.cached_history.windowed(self.range, now);
        let series = SeriesSet::build(&windowed, &self.classifier);

        let latest = self.cached_history.latest().cloned().map(|entry| {
            let changes = detect_changes(
                &entry.properties,
                self.baseline.as_deref(),
                &self.classifier,
            );
            if let Some(changes) = &changes {
                info!("🔔 {} change(s) since last view", changes.len());
            }
            self.advance_baseline(&entry.properties);

            LatestView {
                summary: Summary::of(&entry.properties, &self.classifier),
                cards: entry
                    .properties
                    .iter()
                    .map(|p| PropertyCard::build(p, &self.classifier))
                    .collect(),
                alert: changes.as_deref().map(ChangeAlert::from_changes),
                date: entry.date,
                time: entry.time,
            }
        });

        DashboardView {
            range: self.range,
            latest,
            series,
            flagged_label: self.classifier.flagged_month().needle(),
        }
    }

    fn advance_baseline(&mut self, snapshot: &[PropertyData]) {
        if let Err(e) = self.baseline_cache.save(snapshot) {
            warn!("⚠️ Could not persist snapshot cache: {e}");
        }
        self.baseline = Some(snapshot.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::HistoryEntry;
    use crate::domain::snapshot::{MoveInBreakdown, Property};
    use crate::store::JsonFileStore;
    use crate::tests::utils::unique_temp_path;
    use chrono::{Duration, TimeZone};

    fn property() -> Property {
        Property {
            id: "property_1".into(),
            name: "Tower A".into(),
            url: "https://suumo.jp/library/to_1/".into(),
        }
    }

    fn snapshot(count: u32, breakdown: &[(&str, u32)]) -> PropertyData {
        let breakdown: MoveInBreakdown = breakdown.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        PropertyData::fetched(&property(), count, breakdown)
    }

    fn store_with(dir: &std::path::Path, snapshots: Vec<Vec<PropertyData>>) -> JsonFileStore {
        let store = JsonFileStore::new(dir.join("property_history.json"));
        let start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let mut history = History::new();
        for (i, props) in snapshots.into_iter().enumerate() {
            history.append(HistoryEntry::new(start + Duration::hours(i as i64), props));
        }
        store.save(&history).unwrap();
        store
    }

    #[test]
    fn empty_history_renders_empty_state() {
        let dir = unique_temp_path("ctrl_empty");
        let store = JsonFileStore::new(dir.join("missing.json"));
        let mut ctrl = DashboardController::new(Classifier::default(), BaselineCache::in_dir(&dir));

        ctrl.refresh(&store).unwrap();
        let view = ctrl.render(None, Utc::now());

        assert!(view.latest.is_none());
        assert!(view.series.timestamps.is_empty());
        assert_eq!(view.range, RangeSpec::Days(7));
    }

    #[test]
    fn alerts_once_against_baseline_then_advances() {
        let dir = unique_temp_path("ctrl_alert");
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap();

        let first = store_with(&dir, vec![vec![snapshot(2, &[("26年3月", 1)])]]);
        let mut ctrl = DashboardController::new(Classifier::default(), BaselineCache::in_dir(&dir));
        ctrl.refresh(&first).unwrap();
        let view = ctrl.render(None, now);
        assert!(view.latest.unwrap().alert.is_none());

        let second = store_with(
            &dir,
            vec![
                vec![snapshot(2, &[("26年3月", 1)])],
                vec![snapshot(3, &[("26年3月", 2)])],
            ],
        );

        // A fresh controller picks the baseline up from disk.
        let mut ctrl = DashboardController::new(Classifier::default(), BaselineCache::in_dir(&dir));
        ctrl.refresh(&second).unwrap();
        let latest = ctrl.render(Some(RangeSpec::All), now).latest.unwrap();
        let alert = latest.alert.unwrap();
        assert!(alert.highlight);
        assert_eq!(alert.lines.len(), 2);
        assert!(alert.lines[1].starts_with("[注目] Tower A: 26年3月"));
        assert_eq!(latest.summary.flagged, 2);

        let again = ctrl.render(None, now).latest.unwrap();
        assert!(again.alert.is_none());
        assert_eq!(ctrl.range(), RangeSpec::All);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn cards_sort_tags_for_display() {
        let c = Classifier::default();
        let card = PropertyCard::build(
            &snapshot(4, &[("24年5月", 1), ("相談", 1), ("即入居可", 1), ("26年3月", 1)]),
            &c,
        );
        let labels: Vec<&str> = card.tags.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["26年3月", "即入居可", "相談", "24年5月"]);
        assert_eq!(card.tags[0].category, Category::Flagged);
    }
}
