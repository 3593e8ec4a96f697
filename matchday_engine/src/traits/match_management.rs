use chrono::NaiveDate;

use crate::{
    club_api::match_objects::MatchQueryFilter,
    db_types::{Match, MatchStatus, MatchUpdate, NewMatch},
    traits::StoreError,
};

/// Persistence for fixtures.
#[allow(async_fn_in_trait)]
pub trait MatchManagement {
    /// All matches, by date ascending. Matches on the same date are listed newest first.
    async fn fetch_all_matches(&self) -> Result<Vec<Match>, StoreError>;

    async fn fetch_match(&self, id: i64) -> Result<Option<Match>, StoreError>;

    /// All matches on the given calendar date, newest first.
    async fn fetch_matches_by_date(&self, date: NaiveDate) -> Result<Vec<Match>, StoreError>;

    /// Matches satisfying every criterion in `query`, ordered as for [`Self::fetch_all_matches`].
    async fn search_matches(&self, query: MatchQueryFilter) -> Result<Vec<Match>, StoreError>;

    /// Stores a new fixture with status `NS` and a 0-0 score.
    async fn insert_match(&self, fixture: NewMatch) -> Result<Match, StoreError>;

    /// Applies `update`. Returns `None` if the match does not exist, or if `update.expected_status` is set and the
    /// stored status differs.
    async fn update_match(&self, id: i64, update: MatchUpdate) -> Result<Option<Match>, StoreError>;

    /// Sets the status of a single match. No transition rules are applied at this level.
    async fn update_match_status(&self, id: i64, status: MatchStatus) -> Result<Option<Match>, StoreError>;

    /// Deletes the match and all loans attached to it. Returns the deleted match, if it existed.
    async fn delete_match(&self, id: i64) -> Result<Option<Match>, StoreError>;
}
