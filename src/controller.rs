//! Signup submission lifecycle.
//!
//! ```text
//! Idle --submit--> Submitting --inserted|conflict--> Succeeded --reset--> Idle
//!                  Submitting --error--> Failed --submit--> Submitting
//! ```
//!
//! The controller is driven from a single task. [`SignupController::submit`]
//! is the usual entry point; [`SignupController::begin_submit`] and
//! [`SignupController::settle`] expose the two halves for callers that run
//! the insert themselves.

use crate::models::SignupRequest;
use crate::store::{InsertOutcome, RecordStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info};

pub const RESET_AFTER: Duration = Duration::from_secs(5);
pub const FAILURE_NOTICE: &str = "Something went wrong.";

static IDLE: SubmissionState = SubmissionState::Idle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

impl SubmissionState {
    /// Submitting and Succeeded hold the form closed.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Submitting | Self::Succeeded)
    }
}

/// How a submission ended, from the user's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Joined,
    AlreadyJoined,
    Failed { notice: &'static str },
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub first_name: String,
    pub email: String,
    pub state: SubmissionState,
    pub disabled: bool,
}

/// "A submission settled" broadcast, shared by every controller feeding one
/// counter. Carries a generation number so receivers only see that it moved.
#[derive(Debug, Clone)]
pub struct SettledSignal(Arc<watch::Sender<u64>>);

impl SettledSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self(Arc::new(tx))
    }

    pub fn notify(&self) {
        self.0.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.0.subscribe()
    }
}

impl Default for SettledSignal {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SignupController<S> {
    store: Arc<S>,
    settled: SettledSignal,
    reset_after: Duration,
    first_name: String,
    email: String,
    state: SubmissionState,
    reset_at: Option<Instant>,
}

impl<S: RecordStore> SignupController<S> {
    pub fn new(store: Arc<S>, settled: SettledSignal) -> Self {
        Self {
            store,
            settled,
            reset_after: RESET_AFTER,
            first_name: String::new(),
            email: String::new(),
            state: SubmissionState::Idle,
            reset_at: None,
        }
    }

    pub fn with_reset_after(mut self, reset_after: Duration) -> Self {
        self.reset_after = reset_after;
        self
    }

    pub fn update_field(&mut self, field: Field, value: impl Into<String>) {
        match field {
            Field::FirstName => self.first_name = value.into(),
            Field::Email => self.email = value.into(),
        }
    }

    /// Current state. A `Succeeded` whose reset deadline has passed already
    /// reads as `Idle`, whether or not anything has polled the controller.
    pub fn state(&self) -> &SubmissionState {
        if self.reset_due(Instant::now()) {
            &IDLE
        } else {
            &self.state
        }
    }

    pub fn view(&self) -> FormView {
        let state = self.state().clone();
        FormView {
            first_name: self.first_name.clone(),
            email: self.email.clone(),
            disabled: state.is_locked(),
            state,
        }
    }

    /// When the pending `Succeeded -> Idle` reset fires, if one is pending.
    pub fn reset_deadline(&self) -> Option<Instant> {
        self.reset_at
    }

    /// Runs one submission end to end. `None` means the call was a no-op:
    /// the form is locked or a field is blank.
    pub async fn submit(&mut self) -> Option<Settlement> {
        let request = self.begin_submit()?;
        let result = self.store.insert(&request).await;
        Some(self.settle(result))
    }

    /// Moves to `Submitting` and hands back the insert to issue.
    pub fn begin_submit(&mut self) -> Option<SignupRequest> {
        self.expire_if_due(Instant::now());

        if self.state.is_locked() {
            debug!(state = ?self.state, "submit ignored while form is locked");
            return None;
        }

        let first_name = self.first_name.trim();
        let email = self.email.trim();
        if first_name.is_empty() || email.is_empty() {
            debug!("submit ignored with blank fields");
            return None;
        }

        let request = SignupRequest {
            email: email.to_owned(),
            first_name: first_name.to_owned(),
        };
        self.state = SubmissionState::Submitting;
        self.reset_at = None;
        Some(request)
    }

    /// Applies the store's answer to an in-flight submission.
    pub fn settle(&mut self, result: Result<InsertOutcome, StoreError>) -> Settlement {
        match result {
            Ok(InsertOutcome::Inserted(record)) => {
                info!(email = %record.email, "joined waitlist");
                self.succeed();
                Settlement::Joined
            }
            Ok(InsertOutcome::Conflict) => {
                info!("email already on waitlist");
                self.succeed();
                Settlement::AlreadyJoined
            }
            Err(err) => {
                error!(error = %err, "waitlist submission failed");
                self.state = SubmissionState::Failed(err.to_string());
                self.reset_at = None;
                Settlement::Failed {
                    notice: FAILURE_NOTICE,
                }
            }
        }
    }

    /// Applies the `Succeeded -> Idle` reset if its deadline has passed.
    pub fn expire_if_due(&mut self, now: Instant) -> bool {
        if !self.reset_due(now) {
            return false;
        }
        self.state = SubmissionState::Idle;
        self.reset_at = None;
        true
    }

    fn reset_due(&self, now: Instant) -> bool {
        self.state == SubmissionState::Succeeded && self.reset_at.is_some_and(|at| now >= at)
    }

    /// Sleeps until the pending reset is due and applies it.
    pub async fn wait_for_reset(&mut self) {
        if let Some(at) = self.reset_at {
            tokio::time::sleep_until(at).await;
            self.expire_if_due(Instant::now());
        }
    }

    fn succeed(&mut self) {
        self.first_name.clear();
        self.email.clear();
        self.state = SubmissionState::Succeeded;
        self.reset_at = Some(Instant::now() + self.reset_after);
        self.settled.notify();
    }
}
