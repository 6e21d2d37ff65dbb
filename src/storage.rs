use crate::email::Email;
use crate::models::{SignupRecord, SignupRequest, WaitlistData};
use crate::store::{InsertOutcome, RecordStore, StoreError};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{error, info};

pub const INVALID_INPUT: &str = "invalid_input";

/// JSON-file backed record store. Every insert is written through to disk.
pub struct FileStore {
    path: PathBuf,
    data: Mutex<WaitlistData>,
}

impl FileStore {
    pub async fn open(path: PathBuf) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let data = load_data(&path).await;
        info!(records = data.records.len(), path = %path.display(), "waitlist store opened");
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }
}

impl RecordStore for FileStore {
    async fn insert(&self, request: &SignupRequest) -> Result<InsertOutcome, StoreError> {
        let email = Email::parse(&request.email).map_err(|err| StoreError::Rejected {
            code: INVALID_INPUT.to_owned(),
            message: err.to_string(),
        })?;
        let first_name = request.first_name.trim();
        if first_name.is_empty() {
            return Err(StoreError::Rejected {
                code: INVALID_INPUT.to_owned(),
                message: "first name cannot be empty".to_owned(),
            });
        }

        let key = email.unique_key();
        let mut data = self.data.lock().await;
        if data.records.contains_key(&key) {
            return Ok(InsertOutcome::Conflict);
        }

        let record = SignupRecord {
            email: email.as_str().to_owned(),
            first_name: first_name.to_owned(),
            created_at: Utc::now(),
        };
        data.records.insert(key.clone(), record.clone());

        if let Err(err) = persist_data(&self.path, &data).await {
            data.records.remove(&key);
            return Err(err);
        }

        Ok(InsertOutcome::Inserted(record))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let data = self.data.lock().await;
        Ok(data.records.len() as u64)
    }
}

pub async fn load_data(path: &Path) -> WaitlistData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                WaitlistData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => WaitlistData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            WaitlistData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &WaitlistData) -> Result<(), StoreError> {
    let payload =
        serde_json::to_vec_pretty(data).map_err(|err| StoreError::Unavailable(err.to_string()))?;
    fs::write(path, payload)
        .await
        .map_err(|err| StoreError::Unavailable(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_data_path(label: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "waitlist_storage_{label}_{}_{nanos}.json",
            std::process::id()
        ));
        path
    }

    fn request(first_name: &str, email: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_owned(),
            first_name: first_name.to_owned(),
        }
    }

    #[tokio::test]
    async fn insert_persists_and_reloads() {
        let path = unique_data_path("reload");
        let store = FileStore::open(path.clone()).await.unwrap();

        let outcome = store.insert(&request("Ada", "ada@example.com")).await.unwrap();
        let InsertOutcome::Inserted(record) = outcome else {
            panic!("expected an insert");
        };
        assert_eq!(record.first_name, "Ada");
        assert_eq!(store.count().await.unwrap(), 1);

        let reopened = FileStore::open(path.clone()).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_regardless_of_case() {
        let path = unique_data_path("conflict");
        let store = FileStore::open(path.clone()).await.unwrap();

        store.insert(&request("Ada", "ada@example.com")).await.unwrap();
        let again = store.insert(&request("Ada", " ADA@example.com ")).await.unwrap();
        assert_eq!(again, InsertOutcome::Conflict);
        assert_eq!(store.count().await.unwrap(), 1);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn malformed_input_is_rejected_not_conflicted() {
        let path = unique_data_path("rejected");
        let store = FileStore::open(path.clone()).await.unwrap();

        let err = store.insert(&request("Ada", "not-an-email")).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { ref code, .. } if code == INVALID_INPUT));

        let err = store.insert(&request("   ", "ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() {
        let path = unique_data_path("corrupt");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = FileStore::open(path.clone()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        let _ = std::fs::remove_file(path);
    }
}
