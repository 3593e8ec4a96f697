use std::fmt::Debug;

use log::*;

use crate::{
    club_api::errors::ClubApiError,
    db_types::{NewTeam, Team, TeamUpdate},
    traits::TeamManagement,
};

pub struct TeamApi<B> {
    db: B,
}

impl<B> Debug for TeamApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TeamApi")
    }
}

fn required(field: &str, value: &str) -> Result<String, ClubApiError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ClubApiError::validation(format!("{field} cannot be empty")))
    } else {
        Ok(value.to_string())
    }
}

fn optional_required(field: &str, value: Option<String>) -> Result<Option<String>, ClubApiError> {
    value.map(|v| required(field, &v)).transpose()
}

impl<B> TeamApi<B>
where B: TeamManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub async fn teams(&self) -> Result<Vec<Team>, ClubApiError> {
        Ok(self.db.fetch_all_teams().await?)
    }

    pub async fn team(&self, id: i64) -> Result<Team, ClubApiError> {
        self.db.fetch_team(id).await?.ok_or_else(|| ClubApiError::team_not_found(id))
    }

    /// Registers a new team. The name, captain name and captain phone are required.
    pub async fn create_team(&self, team: NewTeam) -> Result<Team, ClubApiError> {
        let team = NewTeam {
            team_name: required("Team name", &team.team_name)?,
            captain_name: required("Captain name", &team.captain_name)?,
            captain_phone: required("Captain phone", &team.captain_phone)?,
            avatar_url: team.avatar_url,
            user_id: team.user_id,
        };
        let team = self.db.insert_team(team).await?;
        info!("⚽️ Team '{}' registered as #{}", team.team_name, team.id);
        Ok(team)
    }

    pub async fn update_team(&self, id: i64, update: TeamUpdate) -> Result<Team, ClubApiError> {
        let update = TeamUpdate {
            team_name: optional_required("Team name", update.team_name)?,
            captain_name: optional_required("Captain name", update.captain_name)?,
            captain_phone: optional_required("Captain phone", update.captain_phone)?,
            avatar_url: update.avatar_url,
        };
        let team = self.db.update_team(id, update).await?.ok_or_else(|| ClubApiError::team_not_found(id))?;
        debug!("⚽️ Team #{id} updated");
        Ok(team)
    }

    /// Deletes the team and returns it, so that the caller can clean up the stored avatar.
    ///
    /// Teams that still appear in a fixture cannot be deleted.
    pub async fn delete_team(&self, id: i64) -> Result<Team, ClubApiError> {
        let team = self
            .db
            .delete_team(id)
            .await
            .map_err(|e| match ClubApiError::from(e) {
                ClubApiError::Conflict(_) => {
                    ClubApiError::Conflict(format!("Team #{id} still has fixtures. Delete its matches first."))
                },
                e => e,
            })?
            .ok_or_else(|| ClubApiError::team_not_found(id))?;
        info!("⚽️ Team '{}' (#{id}) deleted", team.team_name);
        Ok(team)
    }
}
