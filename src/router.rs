use crate::dashboard::DashboardController;
use crate::db::fetch_runs::recent_fetch_runs;
use crate::db::Database;
use crate::domain::breakdown::SeriesSet;
use crate::domain::category::Classifier;
use crate::domain::history::RangeSpec;
use crate::errors::ServerError;
use crate::responses::{html_response, json_download, json_response, ResultResp};
use crate::spreadsheets::export_history_xlsx;
use crate::store::{BaselineCache, HistoryStore, JsonFileStore};
use crate::templates;
use astra::Request;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

const RECENT_RUNS: usize = 10;

/// Shared by every worker thread of the server.
pub struct AppState {
    pub db: Database,
    pub store: JsonFileStore,
    pub classifier: Classifier,
    pub controller: Mutex<DashboardController>,
}

impl AppState {
    pub fn new(db: Database, store: JsonFileStore, classifier: Classifier, data_dir: &Path) -> Self {
        let controller = DashboardController::new(classifier.clone(), BaselineCache::in_dir(data_dir));
        Self {
            db,
            store,
            classifier,
            controller: Mutex::new(controller),
        }
    }
}

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();

    match (method, path) {
        ("GET", "/") => {
            let range = range_param(&req)?;
            let runs = state.db.with_conn(|conn| recent_fetch_runs(conn, RECENT_RUNS))?;

            let view = {
                // A worker that panicked mid-render leaves only cached state behind.
                let mut controller = state
                    .controller
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                controller.refresh(&state.store)?;
                controller.render(range, Utc::now())
            };

            html_response(templates::pages::dashboard_page(&view, &runs))
        }

        ("GET", "/data/property_history.json") => {
            let history = state.store.load()?;
            json_response(&history)
        }

        ("GET", "/api/series") => {
            let range = range_param(&req)?.unwrap_or_default();
            let history = state.store.load()?.windowed(range, Utc::now());
            json_response(&SeriesSet::build(&history, &state.classifier))
        }

        ("GET", "/export.json") => {
            let history = state.store.load()?;
            json_download(&history, "property_history.json")
        }

        ("GET", "/export.xlsx") => {
            let history = state.store.load()?;
            export_history_xlsx(&history, &state.classifier)
        }

        _ => Err(ServerError::NotFound),
    }
}

fn range_param(req: &Request) -> Result<Option<RangeSpec>, ServerError> {
    parse_query(req)
        .get("range")
        .map(|raw| raw.parse::<RangeSpec>().map_err(ServerError::BadRequest))
        .transpose()
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    let mut map = HashMap::new();

    if let Some(q) = req.uri().query() {
        for pair in q.split('&') {
            let mut parts = pair.splitn(2, '=');
            if let (Some(k), Some(v)) = (parts.next(), parts.next()) {
                map.insert(k.to_string(), v.to_string());
            }
        }
    }

    map
}
