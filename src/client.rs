use crate::models::{CountResponse, ErrorBody, SignupRecord, SignupRequest};
use crate::store::{InsertOutcome, RecordStore, StoreError, UNIQUE_VIOLATION};
use reqwest::{Client, StatusCode};

/// Record store reached over HTTP, speaking the `/api/waitlist` protocol.
///
/// No client-side timeout is set: a slow store keeps the submission in
/// flight until it answers.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: String,
    client: Client,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl RecordStore for HttpStore {
    async fn insert(&self, request: &SignupRequest) -> Result<InsertOutcome, StoreError> {
        let response = self
            .client
            .post(format!("{}/api/waitlist", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if status.is_success() {
            let record: SignupRecord = response
                .json()
                .await
                .map_err(|err| StoreError::Corrupt(err.to_string()))?;
            return Ok(InsertOutcome::Inserted(record));
        }

        let body = response.text().await.map_err(unavailable)?;
        let error = decode_error(status, &body);
        if error.code == UNIQUE_VIOLATION {
            return Ok(InsertOutcome::Conflict);
        }
        Err(StoreError::Rejected {
            code: error.code,
            message: error.message,
        })
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let response = self
            .client
            .get(format!("{}/api/waitlist/count", self.base_url))
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(unavailable)?;
            let error = decode_error(status, &body);
            return Err(StoreError::Rejected {
                code: error.code,
                message: error.message,
            });
        }

        let body: CountResponse = response
            .json()
            .await
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        Ok(body.count)
    }
}

fn unavailable(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

// Non-JSON error bodies (proxies, framework rejections) fall back to the status.
fn decode_error(status: StatusCode, body: &str) -> ErrorBody {
    serde_json::from_str(body).unwrap_or_else(|_| ErrorBody {
        code: status.as_str().to_owned(),
        message: if body.is_empty() {
            status.to_string()
        } else {
            body.to_owned()
        },
    })
}
