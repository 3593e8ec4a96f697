//! SQLite backend for the matchday engine.
//!
//! The schema lives in the embedded `migrations` directory.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
