use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

#[derive(Debug)]
pub struct FetchRun {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub properties_total: i64,
    pub properties_succeeded: Option<i64>,
    pub saved: bool,
    pub error_message: Option<String>,
}

pub fn start_fetch_run(
    conn: &Connection,
    properties_total: usize,
    now: DateTime<Utc>,
) -> Result<i64, ServerError> {
    conn.execute(
        "INSERT INTO fetch_runs (started_at, properties_total, saved) VALUES (?, ?, 0)",
        params![now, properties_total as i64],
    )
    .map_err(|e| ServerError::DbError(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn end_fetch_run(
    conn: &Connection,
    run_id: i64,
    now: DateTime<Utc>,
    succeeded: usize,
    saved: bool,
    error: Option<String>,
) -> Result<(), ServerError> {
    conn.execute(
        "UPDATE fetch_runs SET finished_at = ?, properties_succeeded = ?, saved = ?, error_message = ? WHERE id = ?",
        params![now, succeeded as i64, saved, error, run_id],
    )
    .map_err(|e| ServerError::DbError(e.to_string()))?;
    Ok(())
}

pub fn recent_fetch_runs(conn: &Connection, limit: usize) -> Result<Vec<FetchRun>, ServerError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, started_at, finished_at, properties_total, properties_succeeded, saved, error_message
             FROM fetch_runs ORDER BY started_at DESC, id DESC LIMIT ?",
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(FetchRun {
                id: row.get(0)?,
                started_at: row.get(1)?,
                finished_at: row.get(2)?,
                properties_total: row.get(3)?,
                properties_succeeded: row.get(4)?,
                saved: row.get(5)?,
                error_message: row.get(6)?,
            })
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut runs = Vec::new();
    for r in rows {
        runs.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::init_test_db;
    use chrono::Duration;

    #[test]
    fn records_run_lifecycle() {
        let db = init_test_db();
        let start = Utc::now();

        db.with_conn(|conn| {
            let first = start_fetch_run(conn, 3, start)?;
            end_fetch_run(conn, first, start + Duration::seconds(20), 2, true, None)?;

            let second = start_fetch_run(conn, 3, start + Duration::hours(1))?;
            end_fetch_run(
                conn,
                second,
                start + Duration::hours(1),
                0,
                false,
                Some("no property fetched successfully".into()),
            )?;

            let runs = recent_fetch_runs(conn, 10)?;
            assert_eq!(runs.len(), 2);
            assert_eq!(runs[0].id, second);
            assert!(!runs[0].saved);
            assert_eq!(runs[1].properties_succeeded, Some(2));
            assert!(runs[1].saved);
            assert!(runs[1].finished_at.is_some());
            Ok(())
        })
        .unwrap();
    }
}
