use crate::db::connection::{init_db, Database};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// A path under the OS temp dir that no other test will pick.
pub fn unique_temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "suumo_tracker_{tag}_{}_{:?}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos(),
        std::thread::current().id()
    ))
}

/// Initialize a fresh test DB using the production schema
pub fn init_test_db() -> Database {
    let path = unique_temp_path("db").with_extension("sqlite");
    let db = Database::new(path.to_string_lossy().into_owned());

    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    db
}
