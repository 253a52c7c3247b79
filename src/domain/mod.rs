pub mod breakdown;
pub mod category;
pub mod changes;
pub mod history;
pub mod snapshot;

pub use category::{Category, Classifier, FlaggedMonth};
pub use changes::{detect_changes, ChangeRecord};
pub use history::{History, HistoryEntry, RangeSpec};
pub use snapshot::{MoveInBreakdown, Property, PropertyData};
