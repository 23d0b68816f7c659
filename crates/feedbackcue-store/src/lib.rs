//! # feedbackcue-store
//!
//! Relational storage for FeedbackCue, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed operations for every domain
//! model. The three core services live here as `Database` methods:
//! slug reservation (`boards`), the vote ledger (`votes`) and the feedback
//! query/filter service (`feedback`). Each one runs inside a single SQLite
//! transaction and relies on schema-level uniqueness constraints.

pub mod boards;
pub mod database;
pub mod feedback;
pub mod migrations;
pub mod models;
pub mod sessions;
pub mod users;
pub mod votes;

mod error;
mod row;

pub use database::Database;
pub use error::{Result, StoreError};
pub use feedback::FeedbackFilter;
pub use models::*;
