use std::fmt::Debug;

use chrono::NaiveDateTime;
use log::*;

use crate::{
    club_api::errors::ClubApiError,
    db_types::{Loan, LoanStatus, LoanUpdate, MatchStatus, NewLoan},
    events::{EventProducers, LoanCompletedEvent},
    lifecycle,
    traits::{LoanManagement, MatchManagement, StoreError},
};

/// `LoanApi` manages player loans between teams.
///
/// A loan can only be made for a match that has not kicked off. Once the match has finished, the loan is closed off
/// by [`LoanApi::complete_loans_for_finished_matches`].
pub struct LoanApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for LoanApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LoanApi")
    }
}

impl<B> LoanApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> LoanApi<B>
where B: LoanManagement + MatchManagement
{
    pub async fn loans(&self) -> Result<Vec<Loan>, ClubApiError> {
        Ok(self.db.fetch_all_loans().await?)
    }

    /// Runs the loan completion pass and then returns all loans. A failing completion pass does not prevent the loans
    /// from being listed.
    pub async fn loans_with_completion(&self) -> Result<Vec<Loan>, ClubApiError> {
        match self.complete_loans_for_finished_matches().await {
            Ok(completed) if !completed.is_empty() => {
                debug!("🤝️ {} loans completed before listing", completed.len());
            },
            Ok(_) => {},
            Err(e) => warn!("🤝️ Loan completion pass failed. Listing loans anyway. {e}"),
        }
        self.loans().await
    }

    pub async fn loan(&self, id: i64) -> Result<Loan, ClubApiError> {
        self.db.fetch_loan(id).await?.ok_or_else(|| ClubApiError::loan_not_found(id))
    }

    pub async fn create_loan(&self, loan: NewLoan, now: NaiveDateTime) -> Result<Loan, ClubApiError> {
        check_player_count(loan.number_of_players)?;
        self.check_match_is_open(loan.match_id, now).await?;
        let loan = self.db.insert_loan(loan).await.map_err(unknown_team)?;
        info!(
            "🤝️ Loan #{} created: {} players for {} in match #{}",
            loan.id, loan.number_of_players, loan.team.team_name, loan.fixture.match_id
        );
        Ok(loan)
    }

    /// Modifies a loan. Moving the loan to a different match is subject to the same rules as creating it.
    pub async fn update_loan(&self, id: i64, update: LoanUpdate, now: NaiveDateTime) -> Result<Loan, ClubApiError> {
        if update.is_empty() {
            return Err(ClubApiError::EmptyUpdate);
        }
        if let Some(players) = update.number_of_players {
            check_player_count(players)?;
        }
        let current = self.loan(id).await?;
        if let Some(match_id) = update.match_id.filter(|m| *m != current.fixture.match_id) {
            self.check_match_is_open(match_id, now).await?;
        }
        let loan = self.db.update_loan(id, update).await.map_err(unknown_team)?.ok_or_else(|| {
            debug!("🤝️ Loan #{id} was deleted while it was being updated");
            ClubApiError::loan_not_found(id)
        })?;
        debug!("🤝️ Loan #{id} updated. Status: {}", loan.status);
        Ok(loan)
    }

    pub async fn delete_loan(&self, id: i64) -> Result<Loan, ClubApiError> {
        let loan = self.db.delete_loan(id).await?.ok_or_else(|| ClubApiError::loan_not_found(id))?;
        info!("🤝️ Loan #{id} deleted");
        Ok(loan)
    }

    /// Marks every loan attached to a finished match as `completed`.
    ///
    /// Each loan is updated individually. Failures are logged and skipped, and are retried by the next pass. Returns
    /// the loans that were completed.
    pub async fn complete_loans_for_finished_matches(&self) -> Result<Vec<Loan>, ClubApiError> {
        let outstanding = self.db.fetch_loans_awaiting_completion().await?;
        let mut completed = Vec::with_capacity(outstanding.len());
        for loan in outstanding {
            let id = loan.id;
            match self.db.update_loan_status(id, LoanStatus::Completed).await {
                Ok(Some(loan)) => {
                    debug!("🤝️ Loan #{id} completed. Match #{} is over.", loan.fixture.match_id);
                    self.call_loan_completed_hook(&loan).await;
                    completed.push(loan);
                },
                Ok(None) => debug!("🤝️ Loan #{id} no longer exists. Nothing to complete."),
                Err(e) => error!("🤝️ Could not complete loan #{id}. {e}"),
            }
        }
        Ok(completed)
    }

    async fn check_match_is_open(&self, match_id: i64, now: NaiveDateTime) -> Result<(), ClubApiError> {
        let fixture = self.db.fetch_match(match_id).await?.ok_or_else(|| ClubApiError::match_not_found(match_id))?;
        if fixture.status != MatchStatus::NotStarted ||
            lifecycle::has_started(fixture.match_date, fixture.match_time, now)
        {
            return Err(ClubApiError::MatchAlreadyStarted(match_id));
        }
        Ok(())
    }

    async fn call_loan_completed_hook(&self, loan: &Loan) {
        for emitter in &self.producers.loan_completed_producer {
            debug!("🤝️ Notifying loan completed hook subscribers");
            emitter.publish_event(LoanCompletedEvent::new(loan.clone())).await;
        }
    }
}

fn check_player_count(players: i64) -> Result<(), ClubApiError> {
    if players < 1 {
        Err(ClubApiError::validation("At least one player must be loaned"))
    } else {
        Ok(())
    }
}

fn unknown_team(e: StoreError) -> ClubApiError {
    match e {
        StoreError::ConstraintViolation(s) => {
            debug!("🤝️ Constraint violation while saving a loan. {s}");
            ClubApiError::validation("The team or match for this loan does not exist")
        },
        e => e.into(),
    }
}
