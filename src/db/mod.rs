pub mod connection;
pub mod fetch_runs;
pub mod properties;

pub use connection::{init_db, Database};
