// src/notify/decision.rs

use crate::domain::changes::{has_flagged_change, ChangeRecord};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoChanges,
    NoFlaggedChange,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoChanges => write!(f, "no listing changes"),
            SkipReason::NoFlaggedChange => write!(f, "changes found, none in the flagged month"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendDecision {
    /// `overridden` carries the reason the mail would otherwise be skipped.
    Send { overridden: Option<SkipReason> },
    Skip(SkipReason),
}

impl SendDecision {
    pub fn should_send(&self) -> bool {
        matches!(self, SendDecision::Send { .. })
    }
}

/// Mail goes out only for flagged-month changes unless `force` is set.
pub fn decide(changes: Option<&[ChangeRecord]>, force: bool) -> SendDecision {
    let skip = match changes {
        None => Some(SkipReason::NoChanges),
        Some(c) if c.is_empty() => Some(SkipReason::NoChanges),
        Some(_) if !has_flagged_change(changes) => Some(SkipReason::NoFlaggedChange),
        Some(_) => None,
    };

    match skip {
        Some(reason) if !force => SendDecision::Skip(reason),
        overridden => SendDecision::Send { overridden },
    }
}
