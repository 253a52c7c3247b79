// src/notify/report.rs

use crate::domain::breakdown::{grand_total, total_flagged};
use crate::domain::category::{Category, Classifier};
use crate::domain::changes::{has_flagged_change, ChangeRecord};
use crate::domain::history::HistoryEntry;
use crate::domain::snapshot::MoveInBreakdown;

const BANNER_WIDTH: usize = 50;
const RULE_WIDTH: usize = 40;
const HIGHLIGHT_WIDTH: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportVariant {
    /// Includes each property's move-in breakdown.
    Full,
    /// Counts and URLs only.
    Compact,
}

/// Renders the plain-text notification mail for one history entry.
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    classifier: Classifier,
    site_url: String,
    variant: ReportVariant,
}

impl ReportFormatter {
    pub fn new(classifier: Classifier, site_url: impl Into<String>, variant: ReportVariant) -> Self {
        Self {
            classifier,
            site_url: site_url.into(),
            variant,
        }
    }

    fn flagged_title(&self) -> String {
        format!("{}入居", self.classifier.flagged_month().needle())
    }

    pub fn format(&self, entry: &HistoryEntry, changes: Option<&[ChangeRecord]>) -> String {
        let flagged_count = total_flagged(&entry.properties, &self.classifier);

        let mut lines: Vec<String> = vec![
            "=".repeat(BANNER_WIDTH),
            "SUUMO 物件情報 変更通知".to_string(),
            "=".repeat(BANNER_WIDTH),
            format!("検出日時: {} {}", entry.date, entry.time),
            String::new(),
        ];

        if let Some(changes) = changes.filter(|c| !c.is_empty()) {
            lines.push("変更内容:".to_string());
            lines.push("-".repeat(RULE_WIDTH));

            for (property, group) in group_by_property(changes) {
                lines.push(format!("[物件] {property}"));
                for change in group {
                    if change.is_flagged() {
                        lines.push(format!("  * {} *注目*", change.message()));
                    } else {
                        lines.push(format!("  - {}", change.message()));
                    }
                }
                lines.push(String::new());
            }

            lines.push("-".repeat(RULE_WIDTH));
            lines.push(String::new());
        }

        if flagged_count > 0 {
            lines.push("*".repeat(HIGHLIGHT_WIDTH));
            lines.push(format!("{}: 現在{flagged_count}件", self.flagged_title()));
            lines.push("*".repeat(HIGHLIGHT_WIDTH));
            lines.push(String::new());
        }

        for prop in &entry.properties {
            lines.push("-".repeat(RULE_WIDTH));
            lines.push(format!("[物件] {}", prop.name));
            lines.push(format!("   空室数: {}件", prop.count));

            if self.variant == ReportVariant::Full {
                lines.push("   入居時期:".to_string());
                lines.push(self.format_breakdown(&prop.move_in_breakdown));
            }

            lines.push(format!("   URL: {}", prop.url));
            lines.push(String::new());
        }

        lines.push("=".repeat(BANNER_WIDTH));
        lines.push(format!("合計空室数: {}件", grand_total(&entry.properties)));
        lines.push("=".repeat(BANNER_WIDTH));
        lines.push(String::new());
        lines.push("このメールは自動送信されています。".to_string());
        lines.push("詳細はWebサイトをご確認ください。".to_string());
        lines.push(String::new());
        lines.push(format!("Webサイト: {}", self.site_url));

        lines.join("\n")
    }

    /// Flagged labels, then immediate/negotiable, then everything else;
    /// each bucket sorted and printed only when non-empty.
    pub fn format_breakdown(&self, breakdown: &MoveInBreakdown) -> String {
        if breakdown.is_empty() {
            return "データなし".to_string();
        }

        let mut flagged = Vec::new();
        let mut flexible = Vec::new();
        let mut scheduled = Vec::new();

        for (key, count) in breakdown {
            let line = format!("  * {key}: {count}件");
            match self.classifier.classify(key) {
                Category::Flagged => flagged.push(line),
                Category::Immediate | Category::Negotiable => flexible.push(line),
                Category::Dated => scheduled.push(line),
            }
        }

        let flagged_header = format!("  【{} *注目*】", self.flagged_title());
        let buckets = [
            (flagged_header.as_str(), flagged),
            ("  【即入居可・相談】", flexible),
            ("  【時期指定】", scheduled),
        ];

        let mut out = Vec::new();
        for (header, mut bucket) in buckets {
            if bucket.is_empty() {
                continue;
            }
            bucket.sort();
            out.push(header.to_string());
            out.extend(bucket);
        }
        out.join("\n")
    }

    /// Priority: a flagged change beats a non-zero flagged total, which
    /// beats the plain update subject.
    pub fn subject_line(&self, entry: &HistoryEntry, changes: Option<&[ChangeRecord]>) -> String {
        let needle = self.classifier.flagged_month().needle();
        let flagged_count = total_flagged(&entry.properties, &self.classifier);

        if has_flagged_change(changes) {
            format!(
                "【{needle}入居に変更あり】SUUMO物件情報 {} {}",
                entry.date, entry.time
            )
        } else if flagged_count > 0 {
            format!(
                "【物件情報更新】SUUMO {} {} ({needle}: {flagged_count}件)",
                entry.date, entry.time
            )
        } else {
            format!("【物件情報更新】SUUMO {} {}", entry.date, entry.time)
        }
    }
}

/// Groups changes by property name, keeping first-seen order.
fn group_by_property(changes: &[ChangeRecord]) -> Vec<(&str, Vec<&ChangeRecord>)> {
    let mut groups: Vec<(&str, Vec<&ChangeRecord>)> = Vec::new();
    for change in changes {
        match groups.iter_mut().find(|(name, _)| *name == change.property()) {
            Some((_, group)) => group.push(change),
            None => groups.push((change.property(), vec![change])),
        }
    }
    groups
}
