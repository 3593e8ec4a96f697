mod auth;
mod helpers;
mod loans;
mod matches;
mod mocks;
mod teams;
