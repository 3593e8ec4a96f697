use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::{debug, trace};
use sqlx::{FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Loan, LoanFixture, LoanStatus, LoanUpdate, MatchStatus, NewLoan, TeamSummary},
    traits::StoreError,
};

const LOAN_SELECT: &str = r#"
    SELECT
        l.id,
        l.team_id,
        t.team_name,
        t.avatar_url AS team_avatar_url,
        l.match_id,
        m.match_date,
        m.match_time,
        m.location,
        h.team_name AS home_team_name,
        a.team_name AS away_team_name,
        m.status AS match_status,
        l.number_of_players,
        l.status,
        l.user_id,
        l.created_at,
        l.updated_at
    FROM loans l
    JOIN teams t ON t.id = l.team_id
    JOIN matches m ON m.id = l.match_id
    JOIN teams h ON h.id = m.home_team_id
    JOIN teams a ON a.id = m.away_team_id
    "#;

#[derive(Debug, Clone, FromRow)]
struct LoanRow {
    id: i64,
    team_id: i64,
    team_name: String,
    team_avatar_url: Option<String>,
    match_id: i64,
    match_date: NaiveDate,
    match_time: Option<NaiveTime>,
    location: Option<String>,
    home_team_name: String,
    away_team_name: String,
    match_status: MatchStatus,
    number_of_players: i64,
    status: LoanStatus,
    user_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        Self {
            id: row.id,
            team: TeamSummary { id: row.team_id, team_name: row.team_name, avatar_url: row.team_avatar_url },
            fixture: LoanFixture {
                match_id: row.match_id,
                match_date: row.match_date,
                match_time: row.match_time,
                location: row.location,
                home_team_name: row.home_team_name,
                away_team_name: row.away_team_name,
                status: row.match_status,
            },
            number_of_players: row.number_of_players,
            status: row.status,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn fetch_all_loans(conn: &mut SqliteConnection) -> Result<Vec<Loan>, sqlx::Error> {
    let sql = format!("{LOAN_SELECT} ORDER BY l.created_at DESC, l.id DESC");
    let rows: Vec<LoanRow> = sqlx::query_as(&sql).fetch_all(conn).await?;
    Ok(rows.into_iter().map(Loan::from).collect())
}

pub async fn fetch_loan(id: i64, conn: &mut SqliteConnection) -> Result<Option<Loan>, sqlx::Error> {
    let sql = format!("{LOAN_SELECT} WHERE l.id = $1");
    let row: Option<LoanRow> = sqlx::query_as(&sql).bind(id).fetch_optional(conn).await?;
    Ok(row.map(Loan::from))
}

/// Loans attached to a finished match that have not been closed off yet, oldest first.
pub async fn fetch_loans_awaiting_completion(conn: &mut SqliteConnection) -> Result<Vec<Loan>, sqlx::Error> {
    let sql = format!("{LOAN_SELECT} WHERE m.status = 'FT' AND l.status <> 'completed' ORDER BY l.id ASC");
    let rows: Vec<LoanRow> = sqlx::query_as(&sql).fetch_all(conn).await?;
    trace!("🗃️ {} loans are awaiting completion", rows.len());
    Ok(rows.into_iter().map(Loan::from).collect())
}

pub async fn insert_loan(loan: NewLoan, conn: &mut SqliteConnection) -> Result<Loan, StoreError> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO loans (team_id, match_id, number_of_players, status, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id;
        "#,
    )
    .bind(loan.team_id)
    .bind(loan.match_id)
    .bind(loan.number_of_players)
    .bind(loan.status.to_string())
    .bind(loan.user_id)
    .fetch_one(&mut *conn)
    .await?;
    debug!("🗃️ Loan #{id} of {} players inserted for match #{}", loan.number_of_players, loan.match_id);
    fetch_loan(id, conn)
        .await?
        .ok_or_else(|| StoreError::DatabaseError(format!("Loan #{id} disappeared after it was inserted")))
}

pub async fn update_loan(id: i64, update: LoanUpdate, conn: &mut SqliteConnection) -> Result<Option<Loan>, StoreError> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for loan #{id}. Update request skipped.");
        return Err(StoreError::EmptyUpdate);
    }
    let mut builder = QueryBuilder::new("UPDATE loans SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(team_id) = update.team_id {
        set_clause.push("team_id = ");
        set_clause.push_bind_unseparated(team_id);
    }
    if let Some(match_id) = update.match_id {
        set_clause.push("match_id = ");
        set_clause.push_bind_unseparated(match_id);
    }
    if let Some(players) = update.number_of_players {
        set_clause.push("number_of_players = ");
        set_clause.push_bind_unseparated(players);
    }
    if let Some(status) = update.status {
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(status.to_string());
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING id");
    trace!("🗃️ Executing query: {}", builder.sql());
    let updated = builder.build_query_scalar::<i64>().fetch_optional(&mut *conn).await?;
    match updated {
        Some(id) => Ok(fetch_loan(id, conn).await?),
        None => Ok(None),
    }
}

pub async fn update_loan_status(
    id: i64,
    status: LoanStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Loan>, sqlx::Error> {
    let updated: Option<i64> =
        sqlx::query_scalar("UPDATE loans SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING id")
            .bind(status.to_string())
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    match updated {
        Some(id) => fetch_loan(id, conn).await,
        None => Ok(None),
    }
}

pub async fn delete_loan(id: i64, conn: &mut SqliteConnection) -> Result<Option<Loan>, sqlx::Error> {
    let loan = fetch_loan(id, &mut *conn).await?;
    if loan.is_some() {
        sqlx::query("DELETE FROM loans WHERE id = $1").bind(id).execute(conn).await?;
        debug!("🗃️ Loan #{id} deleted");
    }
    Ok(loan)
}
