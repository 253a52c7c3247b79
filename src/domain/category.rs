// src/domain/category.rs

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Canonical label for units available for immediate move-in.
pub const IMMEDIATE: &str = "即入居可";
/// Canonical label for units whose move-in date is negotiable.
pub const NEGOTIABLE: &str = "相談";

pub const IMMEDIATE_COLOR: &str = "rgba(34, 197, 94, 0.7)";
pub const NEGOTIABLE_COLOR: &str = "rgba(245, 158, 11, 0.7)";
const FALLBACK_COLOR: &str = "rgba(100, 116, 139, 0.7)";

const MONTH_COLORS: [&str; 12] = [
    "rgba(59, 130, 246, 0.7)",  // Jan - blue
    "rgba(236, 72, 153, 0.7)",  // Feb - pink
    "rgba(168, 85, 247, 0.7)",  // Mar - purple
    "rgba(20, 184, 166, 0.7)",  // Apr - teal
    "rgba(132, 204, 22, 0.7)",  // May - lime
    "rgba(251, 146, 60, 0.7)",  // Jun - orange
    "rgba(239, 68, 68, 0.7)",   // Jul - red
    "rgba(34, 211, 238, 0.7)",  // Aug - cyan
    "rgba(163, 230, 53, 0.7)",  // Sep - yellow-green
    "rgba(251, 191, 36, 0.7)",  // Oct - amber
    "rgba(192, 132, 252, 0.7)", // Nov - violet
    "rgba(74, 222, 128, 0.7)",  // Dec - emerald
];

fn dated_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^'?([0-9]{2})年([0-9]{1,2})月([上中下]旬)?$").expect("valid dated label regex")
    })
}

thread_local! {
    static JA_COLLATOR: Option<Collator> =
        Collator::try_new(&locale!("ja").into(), CollatorOptions::new()).ok();
}

/// Japanese collation of two raw labels, falling back to code-point order
/// when the collator is unavailable or reports a tie.
fn collate_ja(a: &str, b: &str) -> Ordering {
    JA_COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => Ordering::Equal,
        })
        .then_with(|| a.cmp(b))
}

fn month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]{1,2})月").expect("valid month regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Flagged,
    Immediate,
    Negotiable,
    Dated,
}

impl Category {
    fn rank(self) -> u8 {
        match self {
            Category::Flagged => 0,
            Category::Immediate => 1,
            Category::Negotiable => 2,
            Category::Dated => 3,
        }
    }
}

/// The year/month whose move-in labels get special treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlaggedMonth {
    /// Two-digit year, as printed on the listing page (26 for 2026).
    pub year: u8,
    pub month: u8,
}

impl FlaggedMonth {
    pub fn new(year: u8, month: u8) -> Self {
        Self { year, month }
    }

    /// The substring every flagged label contains, e.g. "26年3月".
    pub fn needle(&self) -> String {
        format!("{:02}年{}月", self.year, self.month)
    }
}

impl Default for FlaggedMonth {
    fn default() -> Self {
        Self { year: 26, month: 3 }
    }
}

impl fmt::Display for FlaggedMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.needle())
    }
}

impl FromStr for FlaggedMonth {
    type Err = String;

    /// Parses "YY-M", e.g. "26-3".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YY-M, got '{s}'"))?;

        let year: u8 = year
            .parse()
            .map_err(|_| format!("invalid year in '{s}'"))?;
        let month: u8 = month
            .parse()
            .map_err(|_| format!("invalid month in '{s}'"))?;

        if year > 99 {
            return Err(format!("year must be two digits in '{s}'"));
        }
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in '{s}'"));
        }
        Ok(Self { year, month })
    }
}

/// A move-in label of the form `YY年M月[上旬|中旬|下旬]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedLabel {
    pub year: u8,
    pub month: u8,
    pub period: Option<String>,
    key: String,
}

impl DatedLabel {
    /// Accepts an optional leading apostrophe ("'26年3月").
    pub fn parse(label: &str) -> Option<Self> {
        let caps = dated_label_re().captures(label)?;
        let period = caps.get(3).map(|m| m.as_str().to_string());
        Some(Self {
            year: caps[1].parse().ok()?,
            month: caps[2].parse().ok()?,
            key: format!("{}年{}月{}", &caps[1], &caps[2], period.as_deref().unwrap_or("")),
            period,
        })
    }

    /// Breakdown key: the label as printed, apostrophe dropped. Digits are
    /// kept verbatim, so "26年03月" stays distinct from "26年3月".
    pub fn key(&self) -> String {
        self.key.clone()
    }
}

/// Ordering key for move-in labels: Flagged, Immediate, Negotiable, then
/// everything else by Japanese collation of the raw label. Digits are not
/// compared numerically, so "24年10月" sorts before "24年2月".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<'a> {
    rank: u8,
    label: &'a str,
}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| collate_ja(self.label, other.label))
    }
}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    flagged: FlaggedMonth,
    needle: String,
}

impl Classifier {
    pub fn new(flagged: FlaggedMonth) -> Self {
        Self {
            flagged,
            needle: flagged.needle(),
        }
    }

    pub fn flagged_month(&self) -> FlaggedMonth {
        self.flagged
    }

    /// Matches both "26年3月…" and "'26年3月…".
    pub fn is_flagged(&self, label: &str) -> bool {
        label.contains(&self.needle)
    }

    pub fn classify(&self, label: &str) -> Category {
        if self.is_flagged(label) {
            Category::Flagged
        } else if label == IMMEDIATE {
            Category::Immediate
        } else if label == NEGOTIABLE {
            Category::Negotiable
        } else {
            Category::Dated
        }
    }

    pub fn sort_key<'a>(&self, label: &'a str) -> SortKey<'a> {
        SortKey {
            rank: self.classify(label).rank(),
            label,
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.sort_key(a).cmp(&self.sort_key(b))
    }

    pub fn sort_labels<S: AsRef<str>>(&self, labels: &mut [S]) {
        labels.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(FlaggedMonth::default())
    }
}

/// Display colour for a move-in label.
pub fn color_for(label: &str) -> &'static str {
    if label == IMMEDIATE {
        return IMMEDIATE_COLOR;
    }
    if label == NEGOTIABLE {
        return NEGOTIABLE_COLOR;
    }

    month_re()
        .captures(label)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .map(|month| MONTH_COLORS[(month - 1).rem_euclid(12) as usize])
        .unwrap_or(FALLBACK_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classifies_special_and_dated_labels() {
        let c = Classifier::default();
        assert_eq!(c.classify("26年3月"), Category::Flagged);
        assert_eq!(c.classify("26年3月下旬"), Category::Flagged);
        assert_eq!(c.classify("'26年3月"), Category::Flagged);
        assert_eq!(c.classify(IMMEDIATE), Category::Immediate);
        assert_eq!(c.classify(NEGOTIABLE), Category::Negotiable);
        assert_eq!(c.classify("26年4月"), Category::Dated);
        assert_eq!(c.classify("26年12月"), Category::Dated);
        assert_eq!(c.classify("来春予定"), Category::Dated);
    }

    #[test]
    fn flagged_month_is_configurable() {
        let c = Classifier::new("25-11".parse().unwrap());
        assert_eq!(c.classify("25年11月上旬"), Category::Flagged);
        assert_eq!(c.classify("26年3月"), Category::Dated);
    }

    #[test]
    fn flagged_month_rejects_bad_input() {
        assert!("2026-3".parse::<FlaggedMonth>().is_err());
        assert!("26-13".parse::<FlaggedMonth>().is_err());
        assert!("263".parse::<FlaggedMonth>().is_err());
        assert_eq!("26-3".parse::<FlaggedMonth>().unwrap(), FlaggedMonth::default());
    }

    #[test]
    fn sort_order_puts_flagged_first_and_collates_the_rest() {
        let c = Classifier::default();
        let mut labels = vec!["24年2月", NEGOTIABLE, "24年10月", "'26年3月", IMMEDIATE, "26年3月"];
        c.sort_labels(&mut labels);
        assert_eq!(
            labels,
            vec!["'26年3月", "26年3月", IMMEDIATE, NEGOTIABLE, "24年10月", "24年2月"]
        );
    }

    #[test]
    fn dated_labels_use_japanese_collation() {
        let c = Classifier::default();

        let mut periods = vec!["26年4月上旬", "26年4月中旬", "26年4月下旬"];
        c.sort_labels(&mut periods);
        assert_eq!(periods, vec!["26年4月下旬", "26年4月上旬", "26年4月中旬"]);

        let mut opaque = vec!["来春", "未定"];
        c.sort_labels(&mut opaque);
        assert_eq!(opaque, vec!["未定", "来春"]);
    }

    #[test]
    fn parses_dated_labels() {
        let d = DatedLabel::parse("'24年3月上旬").unwrap();
        assert_eq!(d.year, 24);
        assert_eq!(d.month, 3);
        assert_eq!(d.period.as_deref(), Some("上旬"));
        assert_eq!(d.key(), "24年3月上旬");

        assert_eq!(DatedLabel::parse("24年12月").unwrap().key(), "24年12月");

        let padded = DatedLabel::parse("26年03月").unwrap();
        assert_eq!(padded.month, 3);
        assert_eq!(padded.key(), "26年03月");
        assert!(DatedLabel::parse("2024年3月").is_none());
        assert!(DatedLabel::parse("即入居可").is_none());
    }

    #[test]
    fn colors_follow_month_palette() {
        assert_eq!(color_for(IMMEDIATE), IMMEDIATE_COLOR);
        assert_eq!(color_for(NEGOTIABLE), NEGOTIABLE_COLOR);
        assert_eq!(color_for("26年3月"), MONTH_COLORS[2]);
        assert_eq!(color_for("24年12月下旬"), MONTH_COLORS[11]);
        assert_eq!(color_for("24年13月"), MONTH_COLORS[0]);
        assert_eq!(color_for("未定"), FALLBACK_COLOR);
    }

    fn other_label() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(IMMEDIATE.to_string()),
            Just(NEGOTIABLE.to_string()),
            (0u8..100, 1u8..13, prop::option::of(prop::sample::select(vec!["上旬", "中旬", "下旬"])))
                .prop_filter("not the flagged month", |(y, m, _)| (*y, *m) != (26, 3))
                .prop_map(|(y, m, period)| format!("{y:02}年{m}月{}", period.unwrap_or(""))),
            "[a-z未定来春予]{0,6}",
        ]
    }

    proptest! {
        #[test]
        fn flagged_labels_rank_before_everything_else(
            prefix in prop_oneof![Just(String::new()), Just("'".to_string()), "[a-z]{0,3}"],
            suffix in prop_oneof![Just(String::new()), Just("上旬".to_string()), Just("下旬".to_string()), "[a-z]{0,3}"],
            other in other_label(),
        ) {
            let c = Classifier::default();
            let flagged = format!("{prefix}26年3月{suffix}");
            prop_assume!(!c.is_flagged(&other));

            prop_assert_eq!(c.classify(&flagged), Category::Flagged);
            prop_assert_eq!(c.compare(&flagged, &other), Ordering::Less);
            prop_assert_eq!(c.compare(&other, &flagged), Ordering::Greater);
        }
    }
}
