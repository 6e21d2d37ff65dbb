pub mod app;
pub mod client;
pub mod config;
pub mod controller;
pub mod counter;
pub mod email;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod reveal;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

pub use app::router;
pub use client::HttpStore;
pub use config::Config;
pub use controller::{Field, FormView, SettledSignal, Settlement, SignupController, SubmissionState};
pub use counter::{Counter, CounterSync};
pub use state::AppState;
pub use storage::FileStore;
pub use store::{InsertOutcome, RecordStore, StoreError};
