//! The public API of the matchday engine.
//!
//! Each API object wraps a storage backend and applies the club's rules on top of it: input validation, the match
//! status state machine, the auto-finish pass and the loan completion pass.
pub mod errors;
pub mod loan_api;
pub mod match_api;
pub mod match_objects;
pub mod team_api;
pub mod user_api;
