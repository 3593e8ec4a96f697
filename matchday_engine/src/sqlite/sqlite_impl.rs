//! `SqliteDatabase` is a concrete implementation of a matchday engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use chrono::NaiveDate;
use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, loans, matches, new_pool, teams, users};
use crate::{
    club_api::match_objects::MatchQueryFilter,
    db_types::{
        Loan,
        LoanStatus,
        LoanUpdate,
        Match,
        MatchStatus,
        MatchUpdate,
        NewLoan,
        NewMatch,
        NewTeam,
        NewUserAccount,
        Team,
        TeamUpdate,
        UserAccount,
    },
    traits::{LoanManagement, MatchManagement, StoreError, TeamManagement, UserManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl TeamManagement for SqliteDatabase {
    async fn fetch_all_teams(&self) -> Result<Vec<Team>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(teams::fetch_all_teams(&mut conn).await?)
    }

    async fn fetch_team(&self, id: i64) -> Result<Option<Team>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(teams::fetch_team(id, &mut conn).await?)
    }

    async fn insert_team(&self, team: NewTeam) -> Result<Team, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(teams::insert_team(team, &mut conn).await?)
    }

    async fn update_team(&self, id: i64, update: TeamUpdate) -> Result<Option<Team>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        teams::update_team(id, update, &mut conn).await
    }

    async fn delete_team(&self, id: i64) -> Result<Option<Team>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let team = teams::delete_team(id, &mut conn).await.map_err(|e| {
            warn!("🗃️ Could not delete team #{id}. {e}");
            StoreError::from(e)
        })?;
        Ok(team)
    }
}

impl MatchManagement for SqliteDatabase {
    async fn fetch_all_matches(&self) -> Result<Vec<Match>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(matches::fetch_all_matches(&mut conn).await?)
    }

    async fn fetch_match(&self, id: i64) -> Result<Option<Match>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(matches::fetch_match(id, &mut conn).await?)
    }

    async fn fetch_matches_by_date(&self, date: NaiveDate) -> Result<Vec<Match>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(matches::fetch_matches_by_date(date, &mut conn).await?)
    }

    async fn search_matches(&self, query: MatchQueryFilter) -> Result<Vec<Match>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(matches::search_matches(query, &mut conn).await?)
    }

    async fn insert_match(&self, fixture: NewMatch) -> Result<Match, StoreError> {
        let mut tx = self.pool.begin().await?;
        let fixture = matches::insert_match(fixture, &mut tx).await?;
        tx.commit().await?;
        Ok(fixture)
    }

    async fn update_match(&self, id: i64, update: MatchUpdate) -> Result<Option<Match>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let fixture = matches::update_match(id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(fixture)
    }

    async fn update_match_status(&self, id: i64, status: MatchStatus) -> Result<Option<Match>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let fixture = matches::update_match_status(id, status, &mut tx).await?;
        tx.commit().await?;
        Ok(fixture)
    }

    async fn delete_match(&self, id: i64) -> Result<Option<Match>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let fixture = matches::delete_match(id, &mut tx).await?;
        tx.commit().await?;
        Ok(fixture)
    }
}

impl LoanManagement for SqliteDatabase {
    async fn fetch_all_loans(&self) -> Result<Vec<Loan>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(loans::fetch_all_loans(&mut conn).await?)
    }

    async fn fetch_loan(&self, id: i64) -> Result<Option<Loan>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(loans::fetch_loan(id, &mut conn).await?)
    }

    async fn insert_loan(&self, loan: NewLoan) -> Result<Loan, StoreError> {
        let mut tx = self.pool.begin().await?;
        let loan = loans::insert_loan(loan, &mut tx).await?;
        tx.commit().await?;
        Ok(loan)
    }

    async fn update_loan(&self, id: i64, update: LoanUpdate) -> Result<Option<Loan>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let loan = loans::update_loan(id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(loan)
    }

    async fn update_loan_status(&self, id: i64, status: LoanStatus) -> Result<Option<Loan>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let loan = loans::update_loan_status(id, status, &mut tx).await?;
        tx.commit().await?;
        Ok(loan)
    }

    async fn delete_loan(&self, id: i64) -> Result<Option<Loan>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let loan = loans::delete_loan(id, &mut tx).await?;
        tx.commit().await?;
        Ok(loan)
    }

    async fn fetch_loans_awaiting_completion(&self) -> Result<Vec<Loan>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(loans::fetch_loans_awaiting_completion(&mut conn).await?)
    }
}

impl UserManagement for SqliteDatabase {
    async fn upsert_user(&self, user: NewUserAccount) -> Result<UserAccount, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::upsert_user(user, &mut conn).await?)
    }

    async fn fetch_user(&self, id: i64) -> Result<Option<UserAccount>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user(id, &mut conn).await?)
    }

    async fn fetch_user_by_provider_id(&self, provider_id: &str) -> Result<Option<UserAccount>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user_by_provider_id(provider_id, &mut conn).await?)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `MDL_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}
