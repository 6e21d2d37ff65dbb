use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One insert attempt, built fresh for every submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub first_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRecord {
    pub email: String,
    pub first_name: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted store document, keyed by lowercased email.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WaitlistData {
    pub records: BTreeMap<String, SignupRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct JoinForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
}
