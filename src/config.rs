use std::{env, path::PathBuf, time::Duration};

use crate::controller::RESET_AFTER;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/waitlist.json";
pub const DEFAULT_WAITLIST_URL: &str = "http://127.0.0.1:8080";

/// Runtime settings, all taken from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub reset_after: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: resolve_port(),
            data_path: resolve_data_path(),
            reset_after: resolve_reset_after(),
        }
    }
}

pub fn resolve_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_DATA_PATH)
}

pub fn resolve_reset_after() -> Duration {
    env::var("WAITLIST_RESET_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map_or(RESET_AFTER, Duration::from_secs)
}

pub fn resolve_waitlist_url() -> String {
    env::var("WAITLIST_URL").unwrap_or_else(|_| DEFAULT_WAITLIST_URL.to_owned())
}
