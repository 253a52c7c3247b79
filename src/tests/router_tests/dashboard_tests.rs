// src/tests/router_tests/dashboard_tests.rs

use crate::db::fetch_runs::{end_fetch_run, start_fetch_run};
use crate::domain::category::Classifier;
use crate::domain::history::{History, HistoryEntry};
use crate::domain::snapshot::{Property, PropertyData};
use crate::router::{handle, AppState};
use crate::store::{HistoryStore, JsonFileStore, BASELINE_FILE};
use crate::tests::utils::{init_test_db, unique_temp_path};
use astra::{Body, Response};
use chrono::{Duration, Utc};
use http::{Method, Request};
use std::io::Read;
use std::path::PathBuf;

pub(super) fn tower() -> Property {
    Property {
        id: "property_100".into(),
        name: "Harbor Tower".into(),
        url: "https://suumo.jp/library/tf_13/sc_13103/to_100/".into(),
    }
}

pub(super) fn snapshot(count: u32, labels: &[(&str, u32)]) -> PropertyData {
    PropertyData::fetched(
        &tower(),
        count,
        labels.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
    )
}

/// App state over a fresh data dir; entries are stamped one hour apart ending now.
pub(super) fn make_state(snapshots: Vec<Vec<PropertyData>>) -> (AppState, PathBuf) {
    let dir = unique_temp_path("router");
    let store = JsonFileStore::new(dir.join("property_history.json"));

    if !snapshots.is_empty() {
        let n = snapshots.len() as i64;
        let mut history = History::new();
        for (i, props) in snapshots.into_iter().enumerate() {
            let at = Utc::now() - Duration::hours(n - 1 - i as i64);
            history.append(HistoryEntry::new(at, props));
        }
        store.save(&history).expect("Failed to seed history");
    }

    let state = AppState::new(init_test_db(), store, Classifier::default(), &dir);
    (state, dir)
}

pub(super) fn get(uri: &str) -> astra::Request {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub(super) fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body()
        .reader()
        .read_to_string(&mut body)
        .unwrap();
    body
}

#[test]
fn empty_history_renders_empty_state() {
    let (state, dir) = make_state(vec![]);

    let resp = handle(get("/"), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("まだ取得データがありません"));
    assert!(body.contains("この期間のデータはありません"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn dashboard_shows_summary_cards_and_series() {
    let (state, dir) = make_state(vec![vec![snapshot(
        4,
        &[("26年3月", 2), ("即入居可", 1), ("相談", 1)],
    )]]);

    let body = body_string(handle(get("/"), &state).expect("Handler failed"));

    assert!(body.contains("Harbor Tower"));
    assert!(body.contains("26年3月入居"));
    assert!(body.contains("26年3月: 2件"));
    assert!(body.contains("id=\"series\""));
    // First render has no baseline to compare with.
    assert!(!body.contains("change-alert"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn alert_appears_when_history_moves_past_baseline() {
    let (state, dir) = make_state(vec![vec![snapshot(2, &[("26年3月", 1)])]]);
    let first = body_string(handle(get("/"), &state).unwrap());
    assert!(!first.contains("change-alert"));
    assert!(dir.join(BASELINE_FILE).exists());

    let mut history = state.store.load().unwrap();
    history.append(HistoryEntry::new(
        Utc::now(),
        vec![snapshot(5, &[("26年3月", 4)])],
    ));
    state.store.save(&history).unwrap();

    let second = body_string(handle(get("/"), &state).unwrap());
    assert!(second.contains("change-alert"));
    assert!(second.contains("物件数: 2件 → 5件 (3件増加)"));
    assert!(second.contains("[注目] Harbor Tower: 26年3月"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn failed_property_shows_error() {
    let (state, dir) = make_state(vec![vec![PropertyData::failed(&tower(), "HTTP 503")]]);

    let body = body_string(handle(get("/"), &state).unwrap());
    assert!(body.contains("取得失敗: HTTP 503"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn fetch_runs_are_listed() {
    let (state, dir) = make_state(vec![]);
    state
        .db
        .with_conn(|conn| {
            let id = start_fetch_run(conn, 3, Utc::now())?;
            end_fetch_run(conn, id, Utc::now(), 0, false, Some("all failed".into()))
        })
        .unwrap();

    let body = body_string(handle(get("/"), &state).unwrap());
    assert!(body.contains("id=\"fetch-runs\""));
    assert!(body.contains("0 / 3"));
    assert!(body.contains("all failed"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn invalid_range_is_bad_request() {
    let (state, dir) = make_state(vec![]);

    let err = handle(get("/?range=forever"), &state).err().expect("expected an error");
    assert_eq!(err.status(), 400);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn unknown_route_is_not_found() {
    let (state, dir) = make_state(vec![]);

    let err = handle(get("/nope"), &state).err().expect("expected an error");
    assert_eq!(err.status(), 404);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn huge_day_range_shows_everything() {
    let (state, dir) = make_state(vec![vec![snapshot(2, &[("26年3月", 2)])]]);

    let body = body_string(handle(get("/?range=4294967295"), &state).expect("Handler failed"));
    assert!(body.contains("Harbor Tower"));
    assert!(!body.contains("この期間のデータはありません"));

    let resp = handle(get("/api/series?range=4294967295"), &state).expect("Handler failed");
    let json: serde_json::Value = serde_json::from_str(&body_string(resp)).unwrap();
    assert_eq!(json["total"], serde_json::json!([2]));

    let resp = handle(get("/"), &state).expect("Dashboard broken after huge range");
    assert_eq!(resp.status(), 200);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn dashboard_recovers_from_poisoned_controller() {
    let (state, dir) = make_state(vec![vec![snapshot(2, &[("26年3月", 2)])]]);

    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = state.controller.lock().unwrap();
        panic!("render crashed");
    }));
    assert!(state.controller.is_poisoned());

    let resp = handle(get("/"), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("Harbor Tower"));

    let _ = std::fs::remove_dir_all(dir);
}
