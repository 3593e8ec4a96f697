use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Match, MatchStatus},
    lifecycle,
};

//--------------------------------------   MatchQueryFilter    ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchQueryFilter {
    /// Earliest match date (inclusive)
    pub since: Option<NaiveDate>,
    /// Latest match date (inclusive)
    pub until: Option<NaiveDate>,
    pub statuses: Option<Vec<MatchStatus>>,
    /// Matches where this team plays, home or away
    pub team_id: Option<i64>,
    /// Case-insensitive fragment of either team's name
    pub team_name: Option<String>,
}

impl MatchQueryFilter {
    pub fn is_empty(&self) -> bool {
        self.since.is_none() &&
            self.until.is_none() &&
            self.statuses.as_ref().map(|s| s.is_empty()).unwrap_or(true) &&
            self.team_id.is_none() &&
            self.team_name.as_ref().map(|s| s.trim().is_empty()).unwrap_or(true)
    }

    pub fn on_date(self, date: NaiveDate) -> Self {
        self.since(date).until(date)
    }

    pub fn since(mut self, date: NaiveDate) -> Self {
        self.since = Some(date);
        self
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.statuses.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_statuses(mut self, statuses: &[MatchStatus]) -> Self {
        self.statuses.get_or_insert_with(Vec::new).extend_from_slice(statuses);
        self
    }

    pub fn with_team_id(mut self, team_id: i64) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn with_team_name<S: Into<String>>(mut self, name: S) -> Self {
        self.team_name = Some(name.into());
        self
    }
}

//--------------------------------------       MatchView       ---------------------------------------------------------
/// The live clock of a match, as seen at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchClock {
    pub has_started: bool,
    pub elapsed_minutes: Option<i64>,
    /// e.g. `67′`. Finished matches always show `90′`.
    pub elapsed_display: Option<String>,
    pub kickoff_display: Option<String>,
    pub date_display: String,
}

impl MatchClock {
    pub fn new(fixture: &Match, now: NaiveDateTime) -> Self {
        let (date, time, status) = (fixture.match_date, fixture.match_time, fixture.status);
        Self {
            has_started: lifecycle::has_started(date, time, now),
            elapsed_minutes: lifecycle::elapsed_minutes(date, time, now),
            elapsed_display: lifecycle::format_elapsed(date, time, status, now),
            kickoff_display: lifecycle::format_kickoff_time(time),
            date_display: lifecycle::format_match_date(date),
        }
    }
}

/// A match together with its clock. This is what clients receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub fixture: Match,
    pub clock: MatchClock,
}

impl MatchView {
    pub fn new(fixture: Match, now: NaiveDateTime) -> Self {
        let clock = MatchClock::new(&fixture, now);
        Self { fixture, clock }
    }

    pub fn from_matches(matches: Vec<Match>, now: NaiveDateTime) -> Vec<Self> {
        matches.into_iter().map(|m| Self::new(m, now)).collect()
    }
}

//--------------------------------------   AutoFinishResult    ---------------------------------------------------------
/// The outcome of an auto-finish pass.
#[derive(Debug, Clone, Default)]
pub struct AutoFinishResult {
    /// Matches that were moved to `FT`
    pub finished: Vec<Match>,
    /// Ids of matches that were due but could not be updated. They are retried on the next pass.
    pub failed: Vec<i64>,
}

impl AutoFinishResult {
    pub fn finished_count(&self) -> usize {
        self.finished.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn has_changes(&self) -> bool {
        !self.finished.is_empty()
    }
}
