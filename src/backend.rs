// Client for the external managed backend that owns lectures, submissions
// and the server-time RPC. This process never persists those records.

use std::{env, future::Future};

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{ChallengeLecture, Submission};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {0}")]
    Status(StatusCode),
    #[error("invalid server-time payload: {0:?}")]
    BadTimestamp(String),
}

/// Timestamp authority for `ServerClock`: the backend RPC in production,
/// a fake in tests.
pub trait TimeSource {
    fn fetch_now(&self) -> impl Future<Output = Result<DateTime<Utc>, BackendError>> + Send;
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl BackendClient {
    pub fn from_env() -> Self {
        let base_url = env::var("BACKEND_BASE_URL").expect("BACKEND_BASE_URL not set");
        Self::new(base_url, env::var("BACKEND_API_KEY").ok())
    }

    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        BackendClient {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Lectures joined to one challenge, sorted by sequence on the backend.
    pub async fn challenge_lectures(
        &self,
        challenge_id: i64,
    ) -> Result<Vec<ChallengeLecture>, BackendError> {
        self.get_json(&format!("api/challenges/{challenge_id}/lectures"))
            .await
    }

    pub async fn submissions_for_student(
        &self,
        challenge_id: i64,
        student_id: i64,
    ) -> Result<Vec<Submission>, BackendError> {
        self.get_json(&format!(
            "api/challenges/{challenge_id}/students/{student_id}/submissions"
        ))
        .await
    }

    pub async fn submissions_for_challenge(
        &self,
        challenge_id: i64,
    ) -> Result<Vec<Submission>, BackendError> {
        self.get_json(&format!("api/challenges/{challenge_id}/submissions"))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut req = self.http.get(&url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let res = req.send().await?;
        if !res.status().is_success() {
            return Err(BackendError::Status(res.status()));
        }
        Ok(res.json::<T>().await?)
    }
}

impl TimeSource for BackendClient {
    fn fetch_now(&self) -> impl Future<Output = Result<DateTime<Utc>, BackendError>> + Send {
        async move {
            // The RPC returns a single ISO-8601 string, JSON-encoded.
            let raw: String = self.get_json("rpc/server-time").await?;
            let parsed = DateTime::parse_from_rfc3339(&raw)
                .map_err(|_| BackendError::BadTimestamp(raw))?;
            Ok(parsed.with_timezone(&Utc))
        }
    }
}
