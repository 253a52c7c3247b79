// src/cycles.rs
//
// The two scheduled jobs: record a new snapshot, and mail a report about it.

use crate::db::fetch_runs::{end_fetch_run, start_fetch_run};
use crate::db::properties::list_properties;
use crate::db::Database;
use crate::domain::category::Classifier;
use crate::domain::changes::detect_changes;
use crate::domain::history::{History, HistoryEntry};
use crate::errors::ServerError;
use crate::mailer::{MailerError, Notifier};
use crate::notify::{decide, ReportFormatter, SendDecision, SkipReason};
use crate::scraper::Scraper;
use crate::store::{HistoryStore, StoreError};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{error, info, warn};

#[derive(Debug)]
pub enum CycleError {
    NoProperties,
    NoHistory,
    Db(ServerError),
    Store(StoreError),
    Mailer(MailerError),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::NoProperties => write!(f, "no properties registered"),
            CycleError::NoHistory => write!(f, "history is empty"),
            CycleError::Db(e) => write!(f, "{e}"),
            CycleError::Store(e) => write!(f, "{e}"),
            CycleError::Mailer(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CycleError {}

impl From<ServerError> for CycleError {
    fn from(e: ServerError) -> Self {
        CycleError::Db(e)
    }
}

impl From<StoreError> for CycleError {
    fn from(e: StoreError) -> Self {
        CycleError::Store(e)
    }
}

impl From<MailerError> for CycleError {
    fn from(e: MailerError) -> Self {
        CycleError::Mailer(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub saved: bool,
}

/// Scrapes every registered property and appends one history entry.
///
/// Nothing is written to the history when every property failed; the run is
/// still logged in `fetch_runs`.
pub fn run_fetch(
    db: &Database,
    scraper: &dyn Scraper,
    store: &dyn HistoryStore,
    now: DateTime<Utc>,
) -> Result<FetchOutcome, CycleError> {
    let properties = db.with_conn(|conn| list_properties(conn))?;
    if properties.is_empty() {
        return Err(CycleError::NoProperties);
    }

    let run_id = db.with_conn(|conn| start_fetch_run(conn, properties.len(), now))?;
    info!("🚀 Fetching {} properties", properties.len());

    let snapshots = scraper.fetch_all(&properties);
    let succeeded = snapshots.iter().filter(|s| s.success).count();
    let mut outcome = FetchOutcome {
        attempted: snapshots.len(),
        succeeded,
        saved: false,
    };

    if succeeded == 0 {
        error!("❌ No property could be fetched, history left untouched");
        db.with_conn(|conn| {
            end_fetch_run(conn, run_id, Utc::now(), 0, false, Some("no property fetched".into()))
        })?;
        return Ok(outcome);
    }

    let saved = append_and_save(store, HistoryEntry::new(now, snapshots));
    let error_message = saved.as_ref().err().map(|e| e.to_string());
    db.with_conn(|conn| {
        end_fetch_run(conn, run_id, Utc::now(), succeeded, saved.is_ok(), error_message)
    })?;

    let history = saved?;
    outcome.saved = true;
    info!(
        "✅ Saved {}/{} properties ({} entries in history)",
        succeeded,
        outcome.attempted,
        history.len()
    );
    Ok(outcome)
}

fn append_and_save(store: &dyn HistoryStore, entry: HistoryEntry) -> Result<History, StoreError> {
    let mut history = store.load()?;
    history.append(entry);
    store.save(&history)?;
    Ok(history)
}

/// What the notify job decided, with the rendered mail when it sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationPlan {
    Skip(SkipReason),
    Send { subject: String, body: String },
}

/// Diffs the latest entry against the one before it and renders the mail
/// if the decision says to send.
pub fn plan_notification(
    history: &History,
    classifier: &Classifier,
    formatter: &ReportFormatter,
    force: bool,
) -> Result<NotificationPlan, CycleError> {
    let latest = history.latest().ok_or(CycleError::NoHistory)?;
    let previous = history.previous().map(|e| e.properties.as_slice());

    let changes = detect_changes(&latest.properties, previous, classifier);

    match decide(changes.as_deref(), force) {
        SendDecision::Skip(reason) => {
            info!("⏭️ Not sending: {reason}");
            Ok(NotificationPlan::Skip(reason))
        }
        SendDecision::Send { overridden } => {
            if let Some(reason) = overridden {
                warn!("FORCE_SEND set, sending anyway ({reason})");
            }
            Ok(NotificationPlan::Send {
                subject: formatter.subject_line(latest, changes.as_deref()),
                body: formatter.format(latest, changes.as_deref()),
            })
        }
    }
}

/// Sends a planned notification. Returns whether a mail went out.
pub fn deliver(
    plan: &NotificationPlan,
    notifier: Option<&dyn Notifier>,
    recipient: &str,
) -> Result<bool, CycleError> {
    match plan {
        NotificationPlan::Skip(_) => Ok(false),
        NotificationPlan::Send { subject, body } => {
            let notifier = notifier.ok_or_else(|| {
                MailerError::NotConfigured("BREVO_API_KEY / NOTIFICATION_EMAIL".into())
            })?;
            notifier.send(recipient, subject, body)?;
            Ok(true)
        }
    }
}
