use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::db_types::{Loan, Match, MatchStatus};

/// Emitted when a match is moved to `FT`, either by the auto-finish pass or by a manual status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFinishedEvent {
    pub fixture: Match,
    pub previous_status: MatchStatus,
    /// True if the lifecycle rules finished the match, rather than a person
    pub automatic: bool,
    /// Local time at which the change was made
    pub finished_at: NaiveDateTime,
}

impl MatchFinishedEvent {
    pub fn automatic(fixture: Match, previous_status: MatchStatus, finished_at: NaiveDateTime) -> Self {
        Self { fixture, previous_status, automatic: true, finished_at }
    }

    pub fn manual(fixture: Match, previous_status: MatchStatus, finished_at: NaiveDateTime) -> Self {
        Self { fixture, previous_status, automatic: false, finished_at }
    }
}

/// Emitted when a loan is closed off because its match has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCompletedEvent {
    pub loan: Loan,
}

impl LoanCompletedEvent {
    pub fn new(loan: Loan) -> Self {
        Self { loan }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    MatchFinished(MatchFinishedEvent),
    LoanCompleted(LoanCompletedEvent),
}
