//! Small helpers shared by the matchday engine and server crates.
mod helpers;
mod secret;

pub use helpers::{parse_boolean_flag, parse_env_var};
pub use secret::Secret;
