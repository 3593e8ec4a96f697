use crate::{
    db_types::{NewTeam, Team, TeamUpdate},
    traits::StoreError,
};

/// Persistence for teams.
#[allow(async_fn_in_trait)]
pub trait TeamManagement {
    /// All teams, most recently registered first.
    async fn fetch_all_teams(&self) -> Result<Vec<Team>, StoreError>;

    async fn fetch_team(&self, id: i64) -> Result<Option<Team>, StoreError>;

    /// Stores a new team. The values are stored as given, so callers are responsible for trimming and validation.
    async fn insert_team(&self, team: NewTeam) -> Result<Team, StoreError>;

    /// Applies the update and returns the modified team, or `None` if there is no team with this id.
    async fn update_team(&self, id: i64, update: TeamUpdate) -> Result<Option<Team>, StoreError>;

    /// Deletes the team, along with any loans it was involved in. Returns the deleted team, if it existed.
    ///
    /// Fails with [`StoreError::ConstraintViolation`] if the team still appears in any match.
    async fn delete_team(&self, id: i64) -> Result<Option<Team>, StoreError>;
}
