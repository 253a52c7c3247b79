// src/domain/history.rs

use crate::domain::snapshot::PropertyData;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of entries kept; older ones are evicted first.
pub const HISTORY_CAP: usize = 200;

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Japan Standard Time (UTC+9), fixed regardless of the host timezone.
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// All properties' snapshots from one fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// RFC 3339 with explicit "+09:00" offset.
    pub timestamp: String,
    /// "YYYY-MM-DD" in UTC+9.
    pub date: String,
    /// "HH:MM:SS" in UTC+9.
    pub time: String,
    pub properties: Vec<PropertyData>,
}

impl HistoryEntry {
    /// Stamps `properties` with `at`, rendered in UTC+9.
    pub fn new(at: DateTime<Utc>, properties: Vec<PropertyData>) -> Self {
        let local = at.with_timezone(&jst());
        Self {
            timestamp: local.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            date: local.format("%Y-%m-%d").to_string(),
            time: local.format("%H:%M:%S").to_string(),
            properties,
        }
    }

    /// `None` when the stored timestamp does not parse.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Which slice of the history a view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    All,
    Days(u32),
}

impl Default for RangeSpec {
    fn default() -> Self {
        RangeSpec::Days(7)
    }
}

impl FromStr for RangeSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(RangeSpec::All),
            other => other
                .parse::<u32>()
                .map(RangeSpec::Days)
                .map_err(|_| format!("invalid range '{other}' (expected a day count or 'all')")),
        }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeSpec::All => write!(f, "all"),
            RangeSpec::Days(n) => write!(f, "{n}"),
        }
    }
}

/// Append-only, bounded record of fetch cycles, oldest first.
///
/// Serializes as a bare JSON array of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// The entry immediately before the latest one.
    pub fn previous(&self) -> Option<&HistoryEntry> {
        self.entries.iter().rev().nth(1)
    }

    /// Appends `entry`, then evicts from the front down to `HISTORY_CAP`.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        if self.entries.len() > HISTORY_CAP {
            let excess = self.entries.len() - HISTORY_CAP;
            self.entries.drain(..excess);
        }
    }

    /// Entries recorded at or after `now - N days`; `All` copies everything.
    /// Entries with an unparseable timestamp fall outside any day window.
    /// A day count reaching past the representable calendar has no lower
    /// bound and behaves like `All`.
    pub fn windowed(&self, range: RangeSpec, now: DateTime<Utc>) -> History {
        let cutoff = match range {
            RangeSpec::All => None,
            RangeSpec::Days(days) => TimeDelta::try_days(i64::from(days))
                .and_then(|span| now.checked_sub_signed(span)),
        };

        match cutoff {
            None => self.clone(),
            Some(cutoff) => {
                let entries = self
                    .entries
                    .iter()
                    .filter(|e| e.recorded_at().is_some_and(|at| at >= cutoff))
                    .cloned()
                    .collect();
                History { entries }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry_at(at: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry::new(at, Vec::new())
    }

    #[test]
    fn entry_fields_use_fixed_utc_plus_9() {
        let at = Utc.with_ymd_and_hms(2026, 2, 28, 16, 30, 5).unwrap();
        let entry = entry_at(at);

        assert_eq!(entry.timestamp, "2026-03-01T01:30:05+09:00");
        assert_eq!(entry.date, "2026-03-01");
        assert_eq!(entry.time, "01:30:05");
        assert_eq!(entry.recorded_at(), Some(at));
    }

    #[test]
    fn append_evicts_oldest_beyond_cap() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut history = History::new();

        for i in 0..201 {
            history.append(entry_at(start + Duration::minutes(i)));
        }

        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(
            history.entries()[0].recorded_at(),
            Some(start + Duration::minutes(1))
        );
        assert_eq!(
            history.latest().unwrap().recorded_at(),
            Some(start + Duration::minutes(200))
        );
    }

    #[test]
    fn latest_and_previous() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut history = History::new();
        assert!(history.latest().is_none());

        history.append(entry_at(start));
        assert!(history.previous().is_none());

        history.append(entry_at(start + Duration::hours(1)));
        assert_eq!(history.previous().unwrap().recorded_at(), Some(start));
    }

    #[test]
    fn windowed_filters_by_wall_clock_cutoff() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let mut history = History::new();
        history.append(entry_at(now - Duration::days(10)));
        history.append(entry_at(now - Duration::days(7)));
        history.append(entry_at(now - Duration::days(1)));

        let mut broken = entry_at(now);
        broken.timestamp = "not a timestamp".to_string();
        history.append(broken);

        assert_eq!(history.windowed(RangeSpec::Days(7), now).len(), 2);
        assert_eq!(history.windowed(RangeSpec::Days(0), now).len(), 0);
        assert_eq!(history.windowed(RangeSpec::All, now).len(), 4);
    }

    #[test]
    fn windowed_with_huge_day_count_keeps_everything() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let mut history = History::new();
        history.append(entry_at(now - Duration::days(400)));
        history.append(entry_at(now));

        let range: RangeSpec = "4294967295".parse().unwrap();
        assert_eq!(history.windowed(range, now).len(), 2);
    }

    #[test]
    fn range_spec_parses() {
        assert_eq!("all".parse::<RangeSpec>().unwrap(), RangeSpec::All);
        assert_eq!("30".parse::<RangeSpec>().unwrap(), RangeSpec::Days(30));
        assert!("week".parse::<RangeSpec>().is_err());
        assert_eq!(RangeSpec::default().to_string(), "7");
    }

    #[test]
    fn serializes_as_plain_array() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut history = History::new();
        history.append(entry_at(at));

        let json = serde_json::to_value(&history).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["date"], "2026-01-01");
        assert_eq!(json[0]["time"], "09:00:00");
    }
}
