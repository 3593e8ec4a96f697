//! # Match lifecycle
//!
//! Pure functions that decide whether a match has kicked off, how long it has been running, and whether it is overdue
//! for being marked as finished.
//!
//! None of these functions read the clock. The caller supplies `now` as a local (club time zone) timestamp, which
//! keeps the rules deterministic and testable. Use [`ScheduleClock`] to obtain `now` in production code.
//!
//! The kickoff of a match is its calendar date combined with its start time. A match with no start time kicks off at
//! the start of its day.
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

use crate::db_types::MatchStatus;

/// A match that has been running for this many minutes (90 minutes, half time and some stoppage) is considered over.
pub const AUTO_FINISH_THRESHOLD_MINUTES: i64 = 105;
/// Finished matches always display this many minutes, however long ago they ended.
pub const FULL_TIME_DISPLAY_MINUTES: i64 = 90;
/// The prime symbol used for match minutes, e.g. `67′`
pub const MINUTE_MARK: char = '\u{2032}';

pub fn kickoff(date: NaiveDate, time: Option<NaiveTime>) -> NaiveDateTime {
    date.and_time(time.unwrap_or(NaiveTime::MIN))
}

/// True iff `now` is at or after the kickoff.
pub fn has_started(date: NaiveDate, time: Option<NaiveTime>, now: NaiveDateTime) -> bool {
    now >= kickoff(date, time)
}

/// Whole minutes since kickoff, rounded down, or `None` if the match has not started.
pub fn elapsed_minutes(date: NaiveDate, time: Option<NaiveTime>, now: NaiveDateTime) -> Option<i64> {
    if !has_started(date, time, now) {
        return None;
    }
    Some((now - kickoff(date, time)).num_minutes())
}

/// A match should be auto-finished once it has been running for [`AUTO_FINISH_THRESHOLD_MINUTES`], unless it is
/// already finished.
pub fn should_auto_finish(date: NaiveDate, time: Option<NaiveTime>, status: MatchStatus, now: NaiveDateTime) -> bool {
    if status.is_finished() {
        return false;
    }
    elapsed_minutes(date, time, now).map(|m| m >= AUTO_FINISH_THRESHOLD_MINUTES).unwrap_or(false)
}

/// The running clock shown next to a match, e.g. `37′`.
///
/// Finished matches always show `90′`. Matches that have not kicked off show nothing.
pub fn format_elapsed(
    date: NaiveDate,
    time: Option<NaiveTime>,
    status: MatchStatus,
    now: NaiveDateTime,
) -> Option<String> {
    if status.is_finished() {
        return Some(format!("{FULL_TIME_DISPLAY_MINUTES}{MINUTE_MARK}"));
    }
    elapsed_minutes(date, time, now).map(|m| format!("{m}{MINUTE_MARK}"))
}

/// `HH:MM`, or `None` when the match has no start time.
pub fn format_kickoff_time(time: Option<NaiveTime>) -> Option<String> {
    time.map(|t| t.format("%H:%M").to_string())
}

/// Short calendar date, e.g. `Sat, Jun 1`
pub fn format_match_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

//--------------------------------------     ScheduleClock       -------------------------------------------------------
/// Supplies "now" in the club's local time.
///
/// Match dates and times are stored as naive local values, so the wall clock has to be shifted by the club's UTC
/// offset before the lifecycle rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleClock {
    System(FixedOffset),
    /// Always reports the same instant. Used in tests and for replaying a schedule.
    Frozen(NaiveDateTime),
}

impl Default for ScheduleClock {
    fn default() -> Self {
        ScheduleClock::System(Utc.fix())
    }
}

impl ScheduleClock {
    /// A system clock shifted by `offset_minutes` from UTC. Out-of-range offsets fall back to UTC.
    pub fn with_utc_offset_minutes(offset_minutes: i32) -> Self {
        let offset = offset_minutes.checked_mul(60).and_then(FixedOffset::east_opt).unwrap_or_else(|| Utc.fix());
        ScheduleClock::System(offset)
    }

    pub fn now(&self) -> NaiveDateTime {
        match self {
            ScheduleClock::System(offset) => Utc::now().with_timezone(offset).naive_local(),
            ScheduleClock::Frozen(t) => *t,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
