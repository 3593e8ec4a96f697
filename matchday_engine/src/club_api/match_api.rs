use std::fmt::Debug;

use chrono::{NaiveDate, NaiveDateTime};
use log::*;

use crate::{
    club_api::{
        errors::ClubApiError,
        match_objects::{AutoFinishResult, MatchQueryFilter},
    },
    db_types::{Match, MatchStatus, MatchUpdate, NewMatch},
    events::{EventProducers, MatchFinishedEvent},
    lifecycle,
    traits::{MatchManagement, StoreError},
};

/// `MatchApi` manages fixtures: scheduling, score and status updates, and the auto-finish rules.
///
/// Every method that depends on the current time takes `now` (club local time) as an argument.
pub struct MatchApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for MatchApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchApi")
    }
}

impl<B> MatchApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> MatchApi<B>
where B: MatchManagement
{
    /// The full schedule, by date
    pub async fn matches(&self) -> Result<Vec<Match>, ClubApiError> {
        Ok(self.db.fetch_all_matches().await?)
    }

    pub async fn fixture(&self, id: i64) -> Result<Match, ClubApiError> {
        self.db.fetch_match(id).await?.ok_or_else(|| ClubApiError::match_not_found(id))
    }

    pub async fn search(&self, query: MatchQueryFilter) -> Result<Vec<Match>, ClubApiError> {
        Ok(self.db.search_matches(query).await?)
    }

    /// The schedule for a single day.
    ///
    /// Loading a day's schedule runs the auto-finish pass over it, so that overdue matches are never shown as still
    /// running. If any match was finished, the list is reloaded from the store.
    pub async fn matches_for_date(&self, date: NaiveDate, now: NaiveDateTime) -> Result<Vec<Match>, ClubApiError> {
        let fixtures = self.db.fetch_matches_by_date(date).await?;
        let result = self.auto_finish(&fixtures, now).await;
        if result.has_changes() {
            trace!("⏱️ {} matches on {date} were finished. Reloading the schedule.", result.finished_count());
            Ok(self.db.fetch_matches_by_date(date).await?)
        } else {
            Ok(fixtures)
        }
    }

    /// Matches that have not kicked off yet. These are the only matches that players can be loaned for.
    pub async fn upcoming_matches(&self, now: NaiveDateTime) -> Result<Vec<Match>, ClubApiError> {
        let query = MatchQueryFilter::default().since(now.date()).with_status(MatchStatus::NotStarted);
        let fixtures = self.db.search_matches(query).await?;
        Ok(fixtures.into_iter().filter(|m| !lifecycle::has_started(m.match_date, m.match_time, now)).collect())
    }

    /// Schedules a new match. The match always starts out as `NS` with a 0-0 score.
    ///
    /// The two teams must differ, and the kickoff may not be in the past. A match without a start time may be
    /// scheduled for any time today.
    pub async fn create_match(&self, fixture: NewMatch, now: NaiveDateTime) -> Result<Match, ClubApiError> {
        if fixture.home_team_id == fixture.away_team_id {
            return Err(ClubApiError::validation("A team cannot play against itself"));
        }
        if fixture.match_date < now.date() {
            return Err(ClubApiError::validation(format!("{} is in the past", fixture.match_date)));
        }
        if let Some(time) = fixture.match_time {
            if lifecycle::kickoff(fixture.match_date, Some(time)) < now {
                return Err(ClubApiError::validation(format!(
                    "Kickoff at {} on {} is in the past",
                    time.format("%H:%M"),
                    fixture.match_date
                )));
            }
        }
        let fixture = self.db.insert_match(fixture).await.map_err(unknown_team)?;
        info!(
            "⚽️ Match #{} scheduled: {} vs {} on {}",
            fixture.id, fixture.home_team.team_name, fixture.away_team.team_name, fixture.match_date
        );
        Ok(fixture)
    }

    /// Applies score, status, scheduling and metadata changes.
    ///
    /// Status changes must follow the match state machine (see [`MatchStatus::can_transition_to`]).
    pub async fn update_match(
        &self,
        id: i64,
        update: MatchUpdate,
        now: NaiveDateTime,
    ) -> Result<Match, ClubApiError> {
        if update.is_empty() {
            return Err(ClubApiError::EmptyUpdate);
        }
        let current = self.fixture(id).await?;
        if let Some(next) = update.status {
            if !current.status.can_transition_to(next) {
                warn!("⚽️ Rejected status change for match #{id}: {} → {next}", current.status);
                return Err(ClubApiError::ForbiddenStatusChange { from: current.status, to: next });
            }
        }
        let home = update.home_team_id.unwrap_or(current.home_team.id);
        let away = update.away_team_id.unwrap_or(current.away_team.id);
        if home == away {
            return Err(ClubApiError::validation("A team cannot play against itself"));
        }
        if update.home_score.map(|s| s < 0).unwrap_or(false) || update.away_score.map(|s| s < 0).unwrap_or(false) {
            return Err(ClubApiError::validation("Scores cannot be negative"));
        }
        let newly_finished = update.status == Some(MatchStatus::Finished) && !current.status.is_finished();
        let next_status = update.status;
        let update = match next_status {
            Some(_) => update.if_status(current.status),
            None => update,
        };
        let updated = match self.db.update_match(id, update).await.map_err(unknown_team)? {
            Some(updated) => updated,
            None => return Err(self.lost_update(id, next_status).await),
        };
        debug!("⚽️ Match #{id} updated. Status: {}. Score {}-{}", updated.status, updated.home_score, updated.away_score);
        if newly_finished {
            let event = MatchFinishedEvent::manual(updated.clone(), current.status, now);
            self.call_match_finished_hook(event).await;
        }
        Ok(updated)
    }

    /// Explains why a write matched no rows: the match was deleted, or its status moved underneath us.
    async fn lost_update(&self, id: i64, next: Option<MatchStatus>) -> ClubApiError {
        let latest = match self.db.fetch_match(id).await {
            Ok(Some(latest)) => latest,
            Ok(None) => {
                debug!("⚽️ Match #{id} was deleted while it was being updated");
                return ClubApiError::match_not_found(id);
            },
            Err(e) => return e.into(),
        };
        match next {
            Some(next) if !latest.status.can_transition_to(next) => {
                warn!("⚽️ Status of match #{id} changed to {} during the update. {next} is no longer allowed", latest.status);
                ClubApiError::ForbiddenStatusChange { from: latest.status, to: next }
            },
            _ => {
                warn!("⚽️ Status of match #{id} changed to {} during the update", latest.status);
                ClubApiError::Conflict(format!("Match #{id} changed while it was being updated. Please retry."))
            },
        }
    }

    /// Deletes a match that has not kicked off yet. Loans for the match are deleted with it.
    pub async fn delete_match(&self, id: i64, now: NaiveDateTime) -> Result<Match, ClubApiError> {
        let current = self.fixture(id).await?;
        if lifecycle::has_started(current.match_date, current.match_time, now) {
            return Err(ClubApiError::MatchAlreadyStarted(id));
        }
        let deleted = self.db.delete_match(id).await?.ok_or_else(|| ClubApiError::match_not_found(id))?;
        info!("⚽️ Match #{id} deleted");
        Ok(deleted)
    }

    /// Moves every match in `fixtures` that is overdue (see [`lifecycle::should_auto_finish`]) to `FT`.
    ///
    /// Matches are updated one at a time. A failed update is logged and skipped. It will be picked up again by the
    /// next pass.
    pub async fn auto_finish(&self, fixtures: &[Match], now: NaiveDateTime) -> AutoFinishResult {
        let mut result = AutoFinishResult::default();
        let due = fixtures.iter().filter(|m| lifecycle::should_auto_finish(m.match_date, m.match_time, m.status, now));
        for fixture in due {
            let id = fixture.id;
            match self.db.update_match_status(id, MatchStatus::Finished).await {
                Ok(Some(finished)) => {
                    debug!(
                        "⏱️ Match #{id} ({} vs {}) auto-finished after {} minutes",
                        finished.home_team.team_name,
                        finished.away_team.team_name,
                        lifecycle::elapsed_minutes(fixture.match_date, fixture.match_time, now).unwrap_or_default()
                    );
                    let event = MatchFinishedEvent::automatic(finished.clone(), fixture.status, now);
                    self.call_match_finished_hook(event).await;
                    result.finished.push(finished);
                },
                Ok(None) => {
                    debug!("⏱️ Match #{id} no longer exists. Nothing to finish.");
                },
                Err(e) => {
                    error!("⏱️ Could not auto-finish match #{id}. {e}");
                    result.failed.push(id);
                },
            }
        }
        result
    }

    /// The background variant of the auto-finish pass. It considers every unfinished match dated today or earlier.
    pub async fn run_auto_finish_sweep(&self, now: NaiveDateTime) -> Result<AutoFinishResult, ClubApiError> {
        let query = MatchQueryFilter::default().until(now.date()).with_statuses(&[
            MatchStatus::NotStarted,
            MatchStatus::Live,
            MatchStatus::HalfTime,
        ]);
        let candidates = self.db.search_matches(query).await?;
        trace!("⏱️ {} unfinished matches to check", candidates.len());
        Ok(self.auto_finish(&candidates, now).await)
    }

    async fn call_match_finished_hook(&self, event: MatchFinishedEvent) {
        for emitter in &self.producers.match_finished_producer {
            debug!("⏱️ Notifying match finished hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }
}

fn unknown_team(e: StoreError) -> ClubApiError {
    match e {
        StoreError::ConstraintViolation(s) => {
            debug!("⚽️ Constraint violation while saving a match. {s}");
            ClubApiError::validation("The home or away team does not exist")
        },
        e => e.into(),
    }
}
