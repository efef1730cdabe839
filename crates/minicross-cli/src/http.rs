//! HTTP backend for the minicross web API.
//!
//! The server resolves the user from the bearer token; the `user` argument of
//! each [`Backend`] call only shows up in logs.

use std::time::Duration;

use chrono::NaiveDate;
use minicross::{
    Backend, CompletionRecord, CompletionRow, Error as CoreError, ProgressSnapshot,
    Result as CoreResult,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const TIMEOUT_SECS: u64 = 30;

pub struct HttpBackend {
    endpoint: String,
    token: Option<String>,
    agent: ureq::Agent,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    date: NaiveDate,
    #[serde(flatten)]
    record: &'a CompletionRecord,
}

impl HttpBackend {
    pub fn new(endpoint: &str, token: Option<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(TIMEOUT_SECS)))
            .build();
        let agent: ureq::Agent = config.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn authorized<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        match &self.token {
            Some(token) => request.header("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    /// GET a JSON body, mapping 404 to `None`.
    fn get_optional<T: serde::de::DeserializeOwned>(&self, path: &str) -> CoreResult<Option<T>> {
        let url = self.url(path);
        debug!("GET {}", url);
        match self.authorized(self.agent.get(&url)).call() {
            Ok(mut response) => response.body_mut().read_json().map(Some).map_err(map_error),
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(e) => Err(map_error(e)),
        }
    }
}

fn map_error(error: ureq::Error) -> CoreError {
    match error {
        ureq::Error::StatusCode(401) => CoreError::Unauthenticated,
        other => CoreError::backend(other.to_string()),
    }
}

impl Backend for HttpBackend {
    fn fetch_puzzle(&self, date: NaiveDate) -> CoreResult<Option<Value>> {
        self.get_optional(&format!("/api/puzzles/{}", date))
    }

    fn load_progress(&self, user: &str, date: NaiveDate) -> CoreResult<Option<ProgressSnapshot>> {
        debug!("Loading progress for {} on {}", user, date);
        self.get_optional(&format!("/api/progress/{}", date))
    }

    fn save_progress(
        &self,
        user: &str,
        date: NaiveDate,
        snapshot: &ProgressSnapshot,
    ) -> CoreResult<()> {
        let url = self.url(&format!("/api/progress/{}", date));
        debug!("PUT {} ({})", url, user);
        self.authorized(self.agent.put(&url))
            .send_json(snapshot)
            .map_err(map_error)?;
        Ok(())
    }

    fn record_completion(
        &self,
        user: &str,
        date: NaiveDate,
        record: &CompletionRecord,
    ) -> CoreResult<()> {
        let url = self.url("/api/completions");
        debug!("POST {} ({} on {})", url, user, date);
        self.authorized(self.agent.post(&url))
            .send_json(&CompletionBody { date, record })
            .map_err(map_error)?;
        Ok(())
    }

    fn list_completions(&self, user: &str, limit: usize) -> CoreResult<Vec<CompletionRow>> {
        let url = self.url("/api/completions");
        debug!("GET {} ({}, limit {})", url, user, limit);
        let mut response = self
            .authorized(self.agent.get(&url))
            .query("limit", limit.to_string())
            .call()
            .map_err(map_error)?;
        response.body_mut().read_json().map_err(map_error)
    }
}

/// Backend used when no API endpoint is configured. Every call fails, so
/// signed-in writes wait in the sync queue.
pub struct NoEndpoint;

impl NoEndpoint {
    fn unavailable<T>() -> CoreResult<T> {
        Err(CoreError::backend("no API endpoint configured"))
    }
}

impl Backend for NoEndpoint {
    fn fetch_puzzle(&self, _date: NaiveDate) -> CoreResult<Option<Value>> {
        Self::unavailable()
    }

    fn load_progress(&self, _user: &str, _date: NaiveDate) -> CoreResult<Option<ProgressSnapshot>> {
        Self::unavailable()
    }

    fn save_progress(
        &self,
        _user: &str,
        _date: NaiveDate,
        _snapshot: &ProgressSnapshot,
    ) -> CoreResult<()> {
        Self::unavailable()
    }

    fn record_completion(
        &self,
        _user: &str,
        _date: NaiveDate,
        _record: &CompletionRecord,
    ) -> CoreResult<()> {
        Self::unavailable()
    }

    fn list_completions(&self, _user: &str, _limit: usize) -> CoreResult<Vec<CompletionRow>> {
        Self::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("https://api.example.test/", None);
        assert_eq!(
            backend.url("/api/puzzles/2025-09-27"),
            "https://api.example.test/api/puzzles/2025-09-27"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            map_error(ureq::Error::StatusCode(401)),
            CoreError::Unauthenticated
        ));
        assert!(matches!(
            map_error(ureq::Error::StatusCode(500)),
            CoreError::Backend(_)
        ));
    }

    #[test]
    fn test_completion_body_shape() {
        let record = CompletionRecord {
            seconds: 75,
            errors: None,
        };
        let body = CompletionBody {
            date: NaiveDate::from_ymd_opt(2025, 9, 27).unwrap(),
            record: &record,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["date"], "2025-09-27");
        assert_eq!(value["seconds"], 75);
        assert!(value["errors"].is_null());
    }

    #[test]
    fn test_no_endpoint_fails_every_call() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 27).unwrap();
        assert!(NoEndpoint.fetch_puzzle(date).is_err());
        assert!(NoEndpoint.list_completions("u1", 10).is_err());
    }
}
