use thiserror::Error;

use crate::{db_types::MatchStatus, traits::StoreError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClubApiError {
    #[error("Database error: {0}")]
    BackendError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("The request conflicts with existing records. {0}")]
    Conflict(String),
    #[error("Match #{0} has already started")]
    MatchAlreadyStarted(i64),
    #[error("A match cannot move from {from} to {to}")]
    ForbiddenStatusChange { from: MatchStatus, to: MatchStatus },
    #[error("Nothing to update")]
    EmptyUpdate,
}

impl From<StoreError> for ClubApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DatabaseError(s) => Self::BackendError(s),
            StoreError::ConstraintViolation(s) => Self::Conflict(s),
            StoreError::EmptyUpdate => Self::EmptyUpdate,
        }
    }
}

impl ClubApiError {
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn team_not_found(id: i64) -> Self {
        Self::NotFound(format!("Team #{id}"))
    }

    pub fn match_not_found(id: i64) -> Self {
        Self::NotFound(format!("Match #{id}"))
    }

    pub fn loan_not_found(id: i64) -> Self {
        Self::NotFound(format!("Loan #{id}"))
    }
}
