mod decision;
mod report;

pub use decision::{decide, SendDecision, SkipReason};
pub use report::{ReportFormatter, ReportVariant};
