//! Matchday Engine
//!
//! The matchday engine keeps track of a football club's teams, fixtures and player loans, and applies the match
//! lifecycle rules to them. It is storage-agnostic.
//!
//! The library is divided into these main sections:
//! 1. Storage ([`mod@traits`] and the SQLite backend). You should never need to access the database directly. Instead,
//!    use the public API objects. The exception is the data types used in the database. These are defined in the
//!    [`mod@db_types`] module and are public.
//! 2. The match lifecycle rules ([`mod@lifecycle`]). Pure functions deciding whether a match has started, how long it
//!    has been running and when it is overdue for being finished.
//! 3. The public API ([`TeamApi`], [`MatchApi`], [`LoanApi`] and [`UserApi`]). These validate requests and enforce the
//!    lifecycle rules on top of a storage backend.
//!
//! The engine also emits events when a match finishes or a loan is completed. See [`mod@events`] for how to hook into
//! them.
pub mod club_api;
pub mod db_types;
pub mod events;
pub mod lifecycle;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use club_api::{
    errors::ClubApiError,
    loan_api::LoanApi,
    match_api::MatchApi,
    match_objects,
    team_api::TeamApi,
    user_api::UserApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{LoanManagement, MatchManagement, StoreError, TeamManagement, UserManagement};
