use crate::{
    db_types::{Loan, LoanStatus, LoanUpdate, NewLoan},
    traits::StoreError,
};

/// Persistence for player loans.
#[allow(async_fn_in_trait)]
pub trait LoanManagement {
    /// All loans, newest first.
    async fn fetch_all_loans(&self) -> Result<Vec<Loan>, StoreError>;

    async fn fetch_loan(&self, id: i64) -> Result<Option<Loan>, StoreError>;

    async fn insert_loan(&self, loan: NewLoan) -> Result<Loan, StoreError>;

    async fn update_loan(&self, id: i64, update: LoanUpdate) -> Result<Option<Loan>, StoreError>;

    async fn update_loan_status(&self, id: i64, status: LoanStatus) -> Result<Option<Loan>, StoreError>;

    async fn delete_loan(&self, id: i64) -> Result<Option<Loan>, StoreError>;

    /// Loans whose fixture has finished (`FT`) but that have not been marked as `completed` yet.
    async fn fetch_loans_awaiting_completion(&self) -> Result<Vec<Loan>, StoreError>;
}
