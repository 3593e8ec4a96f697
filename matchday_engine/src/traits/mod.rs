//! #  Storage backends
//!
//! This module defines the interface contracts that database *backends* must fulfil to act as the store for the
//! matchday engine.
//!
//! * [`TeamManagement`] stores the club's teams and their captains.
//! * [`MatchManagement`] stores fixtures, scores and lifecycle status.
//! * [`LoanManagement`] stores player loans between teams for a given fixture.
//! * [`UserManagement`] keeps track of the accounts that have logged in.
//!
//! None of these traits encode business rules. Validation and lifecycle rules live in the public API objects in
//! [`crate::club_api`].
mod loan_management;
mod match_management;
mod store_error;
mod team_management;
mod user_management;

pub use loan_management::LoanManagement;
pub use match_management::MatchManagement;
pub use store_error::StoreError;
pub use team_management::TeamManagement;
pub use user_management::UserManagement;
