//! # Matchday server
//! This crate hosts the HTTP server for the matchday engine. It is responsible for:
//! * Signing users in on behalf of the identity provider and issuing session tokens.
//! * Exposing teams, matches and loans to signed-in users.
//! * Storing and serving team avatars.
//! * Running the background sweeps that finish overdue matches and complete loans.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/auth/session`: Called by the identity provider to open a session for a user.
//! * `/avatars/{name}`: Stored team avatars.
//! * `/api/...`: Everything else. These routes need a session token in the `mdl_access_token` header.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod lifecycle_worker;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod storage;

#[cfg(test)]
mod endpoint_tests;
