use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{normalize_avatar_url, NewTeam, Team, TeamUpdate},
    traits::StoreError,
};

pub async fn fetch_all_teams(conn: &mut SqliteConnection) -> Result<Vec<Team>, sqlx::Error> {
    let teams = sqlx::query_as("SELECT * FROM teams ORDER BY created_at DESC, id DESC").fetch_all(conn).await?;
    Ok(teams)
}

pub async fn fetch_team(id: i64, conn: &mut SqliteConnection) -> Result<Option<Team>, sqlx::Error> {
    let team = sqlx::query_as("SELECT * FROM teams WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(team)
}

pub async fn insert_team(team: NewTeam, conn: &mut SqliteConnection) -> Result<Team, sqlx::Error> {
    let avatar_url = team.avatar_url.as_deref().and_then(normalize_avatar_url);
    let team: Team = sqlx::query_as(
        r#"
            INSERT INTO teams (team_name, captain_name, captain_phone, avatar_url, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(team.team_name)
    .bind(team.captain_name)
    .bind(team.captain_phone)
    .bind(avatar_url)
    .bind(team.user_id)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Team '{}' inserted with id {}", team.team_name, team.id);
    Ok(team)
}

pub async fn update_team(
    id: i64,
    update: TeamUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Team>, StoreError> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for team #{id}. Update request skipped.");
        return Err(StoreError::EmptyUpdate);
    }
    let mut builder = QueryBuilder::new("UPDATE teams SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.team_name {
        set_clause.push("team_name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(captain) = update.captain_name {
        set_clause.push("captain_name = ");
        set_clause.push_bind_unseparated(captain);
    }
    if let Some(phone) = update.captain_phone {
        set_clause.push("captain_phone = ");
        set_clause.push_bind_unseparated(phone);
    }
    if let Some(url) = update.avatar_url {
        set_clause.push("avatar_url = ");
        set_clause.push_bind_unseparated(normalize_avatar_url(&url));
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let team = builder.build_query_as::<Team>().fetch_optional(conn).await?;
    Ok(team)
}

/// Deletes the team. Loans involving the team are removed by the cascade, while matches block the deletion.
pub async fn delete_team(id: i64, conn: &mut SqliteConnection) -> Result<Option<Team>, sqlx::Error> {
    let team = sqlx::query_as("DELETE FROM teams WHERE id = $1 RETURNING *").bind(id).fetch_optional(conn).await?;
    Ok(team)
}
