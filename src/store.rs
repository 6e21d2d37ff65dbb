//! The record store seam.
//!
//! Everything durable lives behind [`RecordStore`]: the signup controller and
//! the counter only ever see `insert` and `count`. Uniqueness on email is the
//! store's job, reported back as [`InsertOutcome::Conflict`].

use crate::models::{SignupRecord, SignupRequest};
use std::future::Future;

/// Error code the store reserves for unique-constraint violations.
pub const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(SignupRecord),
    Conflict,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store rejected the request ({code}): {message}")]
    Rejected { code: String, message: String },
    #[error("record store sent an unreadable response: {0}")]
    Corrupt(String),
}

pub trait RecordStore: Send + Sync + 'static {
    fn insert(
        &self,
        request: &SignupRequest,
    ) -> impl Future<Output = Result<InsertOutcome, StoreError>> + Send;

    /// Total number of stored records, without transferring them.
    fn count(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
