use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::{fmt::Debug, sync::Arc};

use crate::{
    backend::{CurrentWeatherResponse, Settings, WeatherHistoryResponse},
    settings::SettingsPayload,
};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Failure talking to the backend. Surfaced to the caller as-is, never retried.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to reach {endpoint}: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("Failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// One page of the history listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPage {
    limit: u32,
    offset: u32,
}

impl HistoryPage {
    pub const MAX_LIMIT: u32 = 100;

    /// Limits outside `1..=100` are clamped; the backend rejects them otherwise.
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit: limit.clamp(1, Self::MAX_LIMIT), offset }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for HistoryPage {
    fn default() -> Self {
        Self::new(10, 0)
    }
}

/// The four backend endpoints the dashboard consumes.
#[async_trait]
pub trait DashboardApi: Send + Sync + Debug {
    async fn current_weather(&self) -> Result<CurrentWeatherResponse, ApiError>;

    async fn weather_history(&self, page: HistoryPage) -> Result<WeatherHistoryResponse, ApiError>;

    async fn settings(&self) -> Result<Settings, ApiError>;

    async fn update_settings(&self, payload: &SettingsPayload) -> Result<Settings, ApiError>;
}

#[async_trait]
impl<T: DashboardApi + ?Sized> DashboardApi for Arc<T> {
    async fn current_weather(&self) -> Result<CurrentWeatherResponse, ApiError> {
        (**self).current_weather().await
    }

    async fn weather_history(&self, page: HistoryPage) -> Result<WeatherHistoryResponse, ApiError> {
        (**self).weather_history(page).await
    }

    async fn settings(&self) -> Result<Settings, ApiError> {
        (**self).settings().await
    }

    async fn update_settings(&self, payload: &SettingsPayload) -> Result<Settings, ApiError> {
        (**self).update_settings(payload).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpDashboardClient {
    base_url: String,
    http: Client,
}

impl HttpDashboardClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    #[tracing::instrument(skip(self, query), level = "debug")]
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let res = self
            .http
            .get(self.url(endpoint))
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        read_json(endpoint, res).await
    }
}

async fn read_json<T: DeserializeOwned>(
    endpoint: &'static str,
    res: reqwest::Response,
) -> Result<T, ApiError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| ApiError::Transport { endpoint, source })?;

    if !status.is_success() {
        return Err(ApiError::Status { endpoint, status, body: truncate_body(&body) });
    }

    serde_json::from_str(&body).map_err(|source| ApiError::Decode { endpoint, source })
}

#[async_trait]
impl DashboardApi for HttpDashboardClient {
    async fn current_weather(&self) -> Result<CurrentWeatherResponse, ApiError> {
        self.get_json("/weather/current", &[]).await
    }

    async fn weather_history(&self, page: HistoryPage) -> Result<WeatherHistoryResponse, ApiError> {
        let query = [("limit", page.limit().to_string()), ("offset", page.offset().to_string())];
        self.get_json("/weather/history", &query).await
    }

    async fn settings(&self) -> Result<Settings, ApiError> {
        self.get_json("/settings", &[]).await
    }

    async fn update_settings(&self, payload: &SettingsPayload) -> Result<Settings, ApiError> {
        const ENDPOINT: &str = "/settings";
        tracing::debug!(endpoint = ENDPOINT, "submitting settings");

        let res = self
            .http
            .post(self.url(ENDPOINT))
            .json(payload)
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint: ENDPOINT, source })?;

        read_json(ENDPOINT, res).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
