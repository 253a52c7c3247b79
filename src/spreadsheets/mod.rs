pub mod export_xlsx;

pub use export_xlsx::{export_history_xlsx, history_workbook};
