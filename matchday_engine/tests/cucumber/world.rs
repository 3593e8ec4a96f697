use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use cucumber::World;
use log::*;
use matchday_engine::{
    events::EventProducers,
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    ClubApiError,
    LoanApi,
    MatchApi,
    SqliteDatabase,
    TeamApi,
};
use tokio::time::sleep;

#[derive(Default, Debug, World)]
pub struct MatchdayWorld {
    pub system: Option<MatchdaySystem>,
    pub now: Option<NaiveDateTime>,
    pub teams: HashMap<String, i64>,
    pub current_match: Option<i64>,
    pub current_loan: Option<i64>,
    pub last_error: Option<ClubApiError>,
}

#[derive(Debug)]
pub struct MatchdaySystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub teams: TeamApi<SqliteDatabase>,
    pub matches: MatchApi<SqliteDatabase>,
    pub loans: LoanApi<SqliteDatabase>,
}

impl MatchdayWorld {
    pub fn system(&self) -> &MatchdaySystem {
        self.system.as_ref().expect("System not initialised")
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now.expect("The time has not been set")
    }

    pub fn team_id(&self, name: &str) -> i64 {
        *self.teams.get(name).unwrap_or_else(|| panic!("Team {name} has not been registered"))
    }

    pub fn match_id(&self) -> i64 {
        self.current_match.expect("No match has been scheduled")
    }

    pub fn loan_id(&self) -> i64 {
        self.current_loan.expect("No loan has been made")
    }
}

impl MatchdaySystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        sleep(std::time::Duration::from_millis(50)).await;
        let teams = TeamApi::new(db.clone());
        let matches = MatchApi::new(db.clone(), EventProducers::default());
        let loans = LoanApi::new(db.clone(), EventProducers::default());
        Self { db_path: url, db, teams, matches, loans }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}

pub fn parse_date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("Dates are written as YYYY-MM-DD")
}

pub fn parse_time(time: &str) -> NaiveTime {
    NaiveTime::parse_from_str(time, "%H:%M").expect("Times are written as HH:MM")
}
