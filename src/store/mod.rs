mod json_file;
mod store_error;

pub use json_file::{BaselineCache, HistoryStore, JsonFileStore, BASELINE_FILE};
pub use store_error::StoreError;
