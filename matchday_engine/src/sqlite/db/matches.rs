use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::{debug, trace};
use sqlx::{FromRow, QueryBuilder, SqliteConnection};

use crate::{
    club_api::match_objects::MatchQueryFilter,
    db_types::{Match, MatchStatus, MatchUpdate, NewMatch, TeamSummary},
    traits::StoreError,
};

const MATCH_SELECT: &str = r#"
    SELECT
        m.id,
        m.home_team_id,
        h.team_name AS home_team_name,
        h.avatar_url AS home_team_avatar_url,
        m.away_team_id,
        a.team_name AS away_team_name,
        a.avatar_url AS away_team_avatar_url,
        m.home_score,
        m.away_score,
        m.status,
        m.league,
        m.country,
        m.match_date,
        m.match_time,
        m.location,
        m.user_id,
        m.created_at,
        m.updated_at
    FROM matches m
    JOIN teams h ON h.id = m.home_team_id
    JOIN teams a ON a.id = m.away_team_id
    "#;

const MATCH_ORDER: &str = " ORDER BY m.match_date ASC, m.created_at DESC, m.id DESC";

#[derive(Debug, Clone, FromRow)]
struct MatchRow {
    id: i64,
    home_team_id: i64,
    home_team_name: String,
    home_team_avatar_url: Option<String>,
    away_team_id: i64,
    away_team_name: String,
    away_team_avatar_url: Option<String>,
    home_score: i64,
    away_score: i64,
    status: MatchStatus,
    league: String,
    country: String,
    match_date: NaiveDate,
    match_time: Option<NaiveTime>,
    location: Option<String>,
    user_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        Self {
            id: row.id,
            home_team: TeamSummary {
                id: row.home_team_id,
                team_name: row.home_team_name,
                avatar_url: row.home_team_avatar_url,
            },
            away_team: TeamSummary {
                id: row.away_team_id,
                team_name: row.away_team_name,
                avatar_url: row.away_team_avatar_url,
            },
            home_score: row.home_score,
            away_score: row.away_score,
            status: row.status,
            league: row.league,
            country: row.country,
            match_date: row.match_date,
            match_time: row.match_time,
            location: row.location,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn empty_to_none(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub async fn fetch_all_matches(conn: &mut SqliteConnection) -> Result<Vec<Match>, sqlx::Error> {
    search_matches(MatchQueryFilter::default(), conn).await
}

pub async fn fetch_match(id: i64, conn: &mut SqliteConnection) -> Result<Option<Match>, sqlx::Error> {
    let sql = format!("{MATCH_SELECT} WHERE m.id = $1");
    let row: Option<MatchRow> = sqlx::query_as(&sql).bind(id).fetch_optional(conn).await?;
    Ok(row.map(Match::from))
}

/// All the matches scheduled for `date`, newest first
pub async fn fetch_matches_by_date(date: NaiveDate, conn: &mut SqliteConnection) -> Result<Vec<Match>, sqlx::Error> {
    let sql = format!("{MATCH_SELECT} WHERE m.match_date = $1 ORDER BY m.created_at DESC, m.id DESC");
    let rows: Vec<MatchRow> = sqlx::query_as(&sql).bind(date).fetch_all(conn).await?;
    Ok(rows.into_iter().map(Match::from).collect())
}

/// Fetches matches according to criteria specified in the `MatchQueryFilter`
///
/// Resulting matches are ordered by date, and then by `created_at` in descending order
pub async fn search_matches(query: MatchQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Match>, sqlx::Error> {
    let mut builder = QueryBuilder::new(MATCH_SELECT);
    if !query.is_empty() {
        builder.push(" WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(since) = query.since {
        where_clause.push("m.match_date >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("m.match_date <= ");
        where_clause.push_bind_unseparated(until);
    }
    if let Some(statuses) = query.statuses.as_ref().filter(|s| !s.is_empty()) {
        let status_clause = statuses.iter().map(|s| format!("'{}'", s.code())).collect::<Vec<String>>().join(",");
        where_clause.push(format!("m.status IN ({status_clause})"));
    }
    if let Some(team_id) = query.team_id {
        where_clause.push("(m.home_team_id = ");
        where_clause.push_bind_unseparated(team_id);
        where_clause.push_unseparated(" OR m.away_team_id = ");
        where_clause.push_bind_unseparated(team_id);
        where_clause.push_unseparated(")");
    }
    if let Some(name) = query.team_name.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{name}%");
        where_clause.push("(h.team_name LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR a.team_name LIKE ");
        where_clause.push_bind_unseparated(pattern);
        where_clause.push_unseparated(")");
    }
    builder.push(MATCH_ORDER);
    trace!("🗃️ Executing query: {}", builder.sql());
    let rows = builder.build_query_as::<MatchRow>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_matches: {}", rows.len());
    Ok(rows.into_iter().map(Match::from).collect())
}

/// Inserts a new fixture. Every fixture starts out as `NS` with a 0-0 score.
pub async fn insert_match(fixture: NewMatch, conn: &mut SqliteConnection) -> Result<Match, StoreError> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO matches (
                home_team_id,
                away_team_id,
                home_score,
                away_score,
                status,
                league,
                country,
                match_date,
                match_time,
                location,
                user_id
            ) VALUES ($1, $2, 0, 0, 'NS', $3, $4, $5, $6, $7, $8)
            RETURNING id;
        "#,
    )
    .bind(fixture.home_team_id)
    .bind(fixture.away_team_id)
    .bind(fixture.league.trim().to_string())
    .bind(fixture.country.trim().to_string())
    .bind(fixture.match_date)
    .bind(fixture.match_time)
    .bind(empty_to_none(fixture.location))
    .bind(fixture.user_id)
    .fetch_one(&mut *conn)
    .await?;
    debug!("🗃️ Match #{id} inserted for {}", fixture.match_date);
    fetch_match(id, conn)
        .await?
        .ok_or_else(|| StoreError::DatabaseError(format!("Match #{id} disappeared after it was inserted")))
}

pub async fn update_match(
    id: i64,
    update: MatchUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Match>, StoreError> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for match #{id}. Update request skipped.");
        return Err(StoreError::EmptyUpdate);
    }
    let mut builder = QueryBuilder::new("UPDATE matches SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(home) = update.home_team_id {
        set_clause.push("home_team_id = ");
        set_clause.push_bind_unseparated(home);
    }
    if let Some(away) = update.away_team_id {
        set_clause.push("away_team_id = ");
        set_clause.push_bind_unseparated(away);
    }
    if let Some(score) = update.home_score {
        set_clause.push("home_score = ");
        set_clause.push_bind_unseparated(score);
    }
    if let Some(score) = update.away_score {
        set_clause.push("away_score = ");
        set_clause.push_bind_unseparated(score);
    }
    if let Some(status) = update.status {
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(status.code());
    }
    if let Some(league) = update.league {
        set_clause.push("league = ");
        set_clause.push_bind_unseparated(league.trim().to_string());
    }
    if let Some(country) = update.country {
        set_clause.push("country = ");
        set_clause.push_bind_unseparated(country.trim().to_string());
    }
    if let Some(date) = update.match_date {
        set_clause.push("match_date = ");
        set_clause.push_bind_unseparated(date);
    }
    if let Some(time) = update.match_time {
        set_clause.push("match_time = ");
        set_clause.push_bind_unseparated(time);
    }
    if update.location.is_some() {
        set_clause.push("location = ");
        set_clause.push_bind_unseparated(empty_to_none(update.location));
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    if let Some(expected) = update.expected_status {
        builder.push(" AND status = ");
        builder.push_bind(expected.code());
    }
    builder.push(" RETURNING id");
    trace!("🗃️ Executing query: {}", builder.sql());
    let updated: Option<i64> = builder.build_query_scalar::<i64>().fetch_optional(&mut *conn).await?;
    match updated {
        Some(id) => Ok(fetch_match(id, conn).await?),
        None => Ok(None),
    }
}

pub async fn update_match_status(
    id: i64,
    status: MatchStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Match>, sqlx::Error> {
    let updated: Option<i64> =
        sqlx::query_scalar("UPDATE matches SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING id")
            .bind(status.code())
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    match updated {
        Some(id) => {
            trace!("🗃️ Match #{id} status set to {status}");
            fetch_match(id, conn).await
        },
        None => Ok(None),
    }
}

/// Deletes the match. Loans for the match are removed by the cascade.
pub async fn delete_match(id: i64, conn: &mut SqliteConnection) -> Result<Option<Match>, sqlx::Error> {
    let fixture = fetch_match(id, &mut *conn).await?;
    if fixture.is_some() {
        sqlx::query("DELETE FROM matches WHERE id = $1").bind(id).execute(conn).await?;
        debug!("🗃️ Match #{id} deleted");
    }
    Ok(fixture)
}
