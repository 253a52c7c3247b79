use super::dashboard_tests::{body_string, get, make_state, snapshot, tower};
use crate::domain::snapshot::{Property, PropertyData};
use crate::router::handle;
use serde_json::Value;
use std::io::Read;

fn annex() -> Property {
    Property {
        id: "property_200".into(),
        name: "Annex".into(),
        url: "https://suumo.jp/library/tf_13/sc_13103/to_200/".into(),
    }
}

#[test]
fn raw_history_is_served_as_json_array() {
    let (state, dir) = make_state(vec![
        vec![snapshot(2, &[("26年3月", 2)])],
        vec![snapshot(3, &[("26年3月", 3)])],
    ]);

    let resp = handle(get("/data/property_history.json"), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "application/json"
    );

    let json: Value = serde_json::from_str(&body_string(resp)).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["properties"][0]["moveInBreakdown"]["26年3月"], 3);
    assert!(entries[0]["timestamp"].as_str().unwrap().ends_with("+09:00"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn series_marks_absent_properties_as_null() {
    let (state, dir) = make_state(vec![
        vec![snapshot(2, &[("即入居可", 2)])],
        vec![
            snapshot(2, &[("即入居可", 2)]),
            PropertyData::fetched(&annex(), 3, [("相談".to_string(), 3)].into_iter().collect()),
        ],
    ]);

    let resp = handle(get("/api/series?range=all"), &state).expect("Handler failed");
    let json: Value = serde_json::from_str(&body_string(resp)).unwrap();

    assert_eq!(json["timestamps"].as_array().unwrap().len(), 2);
    assert_eq!(json["total"], serde_json::json!([2, 5]));

    let annex = json["properties"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "Annex")
        .unwrap();
    assert_eq!(annex["counts"], serde_json::json!([null, 3]));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn json_export_is_a_download() {
    let (state, dir) = make_state(vec![vec![snapshot(1, &[])]]);

    let resp = handle(get("/export.json"), &state).expect("Handler failed");
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("property_history.json"));
    assert!(body_string(resp).contains(&tower().name));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn xlsx_export_returns_workbook() {
    let (state, dir) = make_state(vec![vec![snapshot(1, &[("26年3月", 1)])]]);

    let resp = handle(get("/export.xlsx"), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let mut bytes = Vec::new();
    resp.into_body().reader().read_to_end(&mut bytes).unwrap();
    assert!(bytes.starts_with(b"PK"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn corrupt_history_is_a_server_error() {
    let (state, dir) = make_state(vec![]);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(state.store.path(), "{ not json").unwrap();

    let err = handle(get("/data/property_history.json"), &state)
        .err()
        .expect("expected an error");
    assert_eq!(err.status(), 500);

    let _ = std::fs::remove_dir_all(dir);
}
