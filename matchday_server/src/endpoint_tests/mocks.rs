use chrono::NaiveDate;
use matchday_engine::{
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
    match_objects::MatchQueryFilter,
    traits::{LoanManagement, MatchManagement, StoreError, TeamManagement, UserManagement},
};
use mockall::mock;

mock! {
    pub TeamManager {}
    impl TeamManagement for TeamManager {
        async fn fetch_all_teams(&self) -> Result<Vec<Team>, StoreError>;
        async fn fetch_team(&self, id: i64) -> Result<Option<Team>, StoreError>;
        async fn insert_team(&self, team: NewTeam) -> Result<Team, StoreError>;
        async fn update_team(&self, id: i64, update: TeamUpdate) -> Result<Option<Team>, StoreError>;
        async fn delete_team(&self, id: i64) -> Result<Option<Team>, StoreError>;
    }
}

mock! {
    pub UserManager {}
    impl UserManagement for UserManager {
        async fn upsert_user(&self, user: NewUserAccount) -> Result<UserAccount, StoreError>;
        async fn fetch_user(&self, id: i64) -> Result<Option<UserAccount>, StoreError>;
        async fn fetch_user_by_provider_id(&self, provider_id: &str) -> Result<Option<UserAccount>, StoreError>;
    }
}

// Loans need both matches and loans, so a single mock covers the two traits
mock! {
    pub ClubStore {}
    impl MatchManagement for ClubStore {
        async fn fetch_all_matches(&self) -> Result<Vec<Match>, StoreError>;
        async fn fetch_match(&self, id: i64) -> Result<Option<Match>, StoreError>;
        async fn fetch_matches_by_date(&self, date: NaiveDate) -> Result<Vec<Match>, StoreError>;
        async fn search_matches(&self, query: MatchQueryFilter) -> Result<Vec<Match>, StoreError>;
        async fn insert_match(&self, fixture: NewMatch) -> Result<Match, StoreError>;
        async fn update_match(&self, id: i64, update: MatchUpdate) -> Result<Option<Match>, StoreError>;
        async fn update_match_status(&self, id: i64, status: MatchStatus) -> Result<Option<Match>, StoreError>;
        async fn delete_match(&self, id: i64) -> Result<Option<Match>, StoreError>;
    }
    impl LoanManagement for ClubStore {
        async fn fetch_all_loans(&self) -> Result<Vec<Loan>, StoreError>;
        async fn fetch_loan(&self, id: i64) -> Result<Option<Loan>, StoreError>;
        async fn insert_loan(&self, loan: NewLoan) -> Result<Loan, StoreError>;
        async fn update_loan(&self, id: i64, update: LoanUpdate) -> Result<Option<Loan>, StoreError>;
        async fn update_loan_status(&self, id: i64, status: LoanStatus) -> Result<Option<Loan>, StoreError>;
        async fn delete_loan(&self, id: i64) -> Result<Option<Loan>, StoreError>;
        async fn fetch_loans_awaiting_completion(&self) -> Result<Vec<Loan>, StoreError>;
    }
}
