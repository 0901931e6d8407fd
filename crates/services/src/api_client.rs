//! HTTP client for the planner REST API.

use std::env;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use study_core::model::{NewUser, RecordId, StudyTimeRecord, User, UserId};
use url::Url;

use crate::error::ApiClientError;
use crate::resource::Resource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `url::ParseError` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
        })
    }

    /// Reads `STUDY_API_URL`; `None` when unset, blank or unparsable.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let raw = env::var("STUDY_API_URL").ok()?;
        if raw.trim().is_empty() {
            return None;
        }
        match Self::new(raw.trim()) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(url = %raw, error = %e, "ignoring invalid STUDY_API_URL");
                None
            }
        }
    }
}

/// Thin typed wrapper over the `/api/*` routes.
///
/// Without a config every call fails with [`ApiClientError::Disabled`], which
/// callers treat like an unreachable server.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    config: Option<ApiConfig>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiClientError::Http` if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, ApiClientError> {
        Self::new(ApiConfig::from_env())
    }

    /// # Errors
    ///
    /// Returns `ApiClientError::Http` if the HTTP client cannot be built.
    pub fn new(config: Option<ApiConfig>) -> Result<Self, ApiClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// A client that never reaches a server.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            client: Client::new(),
            config: None,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiClientError> {
        let config = self.config.as_ref().ok_or(ApiClientError::Disabled)?;
        let base = config.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    //
    // ─── RECORDS ───────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `ApiClientError` when the API is disabled, unreachable or
    /// answers with a non-success status.
    pub async fn list<R: Resource>(&self, user_id: UserId) -> Result<Vec<R>, ApiClientError> {
        let url = self.endpoint(R::PATH)?;
        let response = self
            .client
            .get(url)
            .query(&[("userId", user_id.value())])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// # Errors
    ///
    /// Returns `ApiClientError` when the request fails or is rejected.
    pub async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<R, ApiClientError> {
        let url = self.endpoint(R::PATH)?;
        let response = self.client.post(url).json(draft).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// Returns `None` when the server has no record with `id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiClientError` when the request fails or is rejected.
    pub async fn update<R: Resource>(
        &self,
        id: R::Id,
        patch: &R::Patch,
    ) -> Result<Option<R>, ApiClientError> {
        let url = self.endpoint(&format!("{}/{}", R::PATH, id.value()))?;
        let response = self.client.put(url).json(patch).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response).await?.json().await?))
    }

    /// Returns `false` when the server has no record with `id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiClientError` when the request fails or is rejected.
    pub async fn delete<R: Resource>(&self, id: R::Id) -> Result<bool, ApiClientError> {
        let url = self.endpoint(&format!("{}/{}", R::PATH, id.value()))?;
        let response = self.client.delete(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(response).await?;
        Ok(true)
    }

    /// Study-time records dated within `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns `ApiClientError` when the request fails or is rejected.
    pub async fn list_time_records_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<StudyTimeRecord>, ApiClientError> {
        let url = self.endpoint(<StudyTimeRecord as Resource>::PATH)?;
        let response = self
            .client
            .get(url)
            .query(&[
                ("userId", user_id.value().to_string()),
                ("startDate", start.format("%Y-%m-%d").to_string()),
                ("endDate", end.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    //
    // ─── USERS ─────────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `ApiClientError` when the request fails or is rejected.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, ApiClientError> {
        let url = self.endpoint(&format!("/api/users/{id}"))?;
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response).await?.json().await?))
    }

    /// # Errors
    ///
    /// Returns `ApiClientError::HttpStatus` with status 409 when the username
    /// is taken, or another `ApiClientError` when the request fails.
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiClientError> {
        let url = self.endpoint("/api/users")?;
        let response = self.client.post(url).json(user).send().await?;
        Ok(check(response).await?.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

async fn check(response: Response) -> Result<Response, ApiClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_owned(),
    };
    Err(ApiClientError::HttpStatus { status, message })
}
