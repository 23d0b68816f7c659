//! # feedbackcue-shared
//!
//! Domain vocabulary shared by the store and the HTTP server: the closed
//! status/category enumerations, sort keys, vote outcomes, slug
//! normalization and input validation.

pub mod constants;
pub mod error;
pub mod slug;
pub mod types;
pub mod validate;

pub use error::ValidationError;
pub use types::{FeedbackCategory, FeedbackStatus, SortKey, VoteOutcome};
