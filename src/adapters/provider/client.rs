//! Rate-limited provider client
//!
//! Every request goes through the shared [`RateLimiter`], then through a retry
//! loop with exponential backoff. Transport failures are retried; a response
//! body that is not valid JSON or does not match the expected model is a
//! validation error and is returned immediately.

use super::models::{
    DailyDfsResponse, DfsProjectionsResponse, GameLogsResponse, GamesResponse, InjuriesResponse,
    LineupResponse, PlayersResponse,
};
use super::params::QueryParams;
use super::rate_limit::RateLimiter;
use crate::config::{secret_string, ProviderConfig, RetryConfig, SecretString};
use crate::domain::{ApiError, ApiErrorCode, Result, SyncError};
use base64::{engine::general_purpose, Engine as _};
use chrono::NaiveDate;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on pages walked by [`RateLimitedApiClient::fetch_all_players`]
const MAX_PAGES: u32 = 200;

/// Longest response body kept in [`ApiError::details`]
const MAX_ERROR_BODY: usize = 512;

/// Client for the stats provider
///
/// # Example
///
/// ```no_run
/// use courtsync::adapters::provider::{QueryParams, RateLimitedApiClient};
/// use courtsync::config::load_config;
///
/// # async fn example() -> courtsync::domain::Result<()> {
/// let config = load_config("courtsync.toml")?;
/// let client = RateLimitedApiClient::new(&config.provider)?;
///
/// let injuries = client.fetch_injuries(&QueryParams::new().set("team", "BOS")).await?;
/// println!("{} players listed", injuries.players.len());
/// # Ok(())
/// # }
/// ```
pub struct RateLimitedApiClient {
    base_url: String,
    season: String,
    client: Client,
    auth_header: SecretString,
    limiter: Arc<RateLimiter>,
    retry: RetryConfig,
    page_size: u32,
    inter_page_delay: Duration,
}

impl RateLimitedApiClient {
    /// Creates a client with its own rate limiter
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::from_millis(config.request_delay_ms));
        Self::with_rate_limiter(config, limiter)
    }

    /// Creates a client that paces requests through an existing limiter
    pub fn with_rate_limiter(config: &ProviderConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .build()
            .map_err(|e| {
                SyncError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        let credentials = format!(
            "{}:{}",
            config.api_key.expose_secret(),
            config.password.expose_secret()
        );
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            season: config.season.clone(),
            client,
            auth_header: secret_string(format!("Basic {encoded}")),
            limiter,
            retry: config.retry.clone(),
            page_size: config.page_size,
            inter_page_delay: Duration::from_millis(config.inter_page_delay_ms),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    /// Pause applied between pages or days of a multi-request fetch
    pub fn inter_page_delay(&self) -> Duration {
        self.inter_page_delay
    }

    /// Fetches an endpoint and returns the parsed JSON body
    pub async fn fetch(&self, endpoint: &str, params: &QueryParams) -> Result<serde_json::Value> {
        let body = self.fetch_body(endpoint, params).await?;
        serde_json::from_str(&body).map_err(|e| {
            SyncError::Validation(format!("{endpoint} returned a body that is not JSON: {e}"))
        })
    }

    /// Fetches an endpoint and validates the body against `T`
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams,
    ) -> Result<T> {
        let body = self.fetch_body(endpoint, params).await?;
        let deserializer = &mut serde_json::Deserializer::from_str(&body);
        serde_path_to_error::deserialize(deserializer).map_err(|e| {
            SyncError::Validation(format!(
                "{endpoint} payload failed validation at '{}': {}",
                e.path(),
                e.inner()
            ))
        })
    }

    /// Issues a minimal read; any failure maps to `false`
    pub async fn health_check(&self) -> bool {
        let params = QueryParams::new().set("limit", 1);
        match self.fetch("players.json", &params).await {
            Ok(_) => {
                tracing::info!(base_url = %self.base_url, "Provider health check passed");
                true
            }
            Err(e) => {
                tracing::error!(base_url = %self.base_url, error = %e, "Provider health check failed");
                false
            }
        }
    }

    pub async fn fetch_players(&self, params: &QueryParams) -> Result<PlayersResponse> {
        self.fetch_as("players.json", params).await
    }

    /// Walks `offset`/`limit` pages until the provider returns a short page
    pub async fn fetch_all_players(&self, params: &QueryParams) -> Result<PlayersResponse> {
        let page_size = self.page_size;
        let mut merged = PlayersResponse {
            last_updated_on: None,
            players: Vec::new(),
            references: None,
        };

        for page in 0..MAX_PAGES {
            if page > 0 && !self.inter_page_delay.is_zero() {
                tokio::time::sleep(self.inter_page_delay).await;
            }

            let page_params = params
                .clone()
                .set("offset", page * page_size)
                .set("limit", page_size);
            let response = self.fetch_players(&page_params).await?;
            let received = response.players.len();

            tracing::debug!(page, received, "Fetched players page");

            merged.last_updated_on = merged.last_updated_on.or(response.last_updated_on);
            merged.players.extend(response.players);
            if let Some(references) = response.references {
                let target = merged.references.get_or_insert_with(Default::default);
                target.team_references.extend(references.team_references);
                target.venue_references.extend(references.venue_references);
            }

            if received < page_size as usize {
                return Ok(merged);
            }
        }

        tracing::warn!(
            max_pages = MAX_PAGES,
            players = merged.players.len(),
            "Stopped paging players at page limit"
        );
        Ok(merged)
    }

    pub async fn fetch_games(&self, date: NaiveDate, params: &QueryParams) -> Result<GamesResponse> {
        self.fetch_as(&self.dated_endpoint(date, "games.json"), params)
            .await
    }

    pub async fn fetch_game_logs(
        &self,
        date: NaiveDate,
        params: &QueryParams,
    ) -> Result<GameLogsResponse> {
        self.fetch_as(&self.dated_endpoint(date, "player_gamelogs.json"), params)
            .await
    }

    pub async fn fetch_injuries(&self, params: &QueryParams) -> Result<InjuriesResponse> {
        self.fetch_as("injuries.json", params).await
    }

    pub async fn fetch_dfs_projections(
        &self,
        date: NaiveDate,
        params: &QueryParams,
    ) -> Result<DfsProjectionsResponse> {
        self.fetch_as(&self.dated_endpoint(date, "dfs_projections.json"), params)
            .await
    }

    pub async fn fetch_daily_dfs(
        &self,
        date: NaiveDate,
        params: &QueryParams,
    ) -> Result<DailyDfsResponse> {
        self.fetch_as(&self.dated_endpoint(date, "dfs.json"), params)
            .await
    }

    pub async fn fetch_lineup(&self, game_id: i64, params: &QueryParams) -> Result<LineupResponse> {
        let endpoint = format!("{}/games/{}/lineup.json", self.season, game_id);
        self.fetch_as(&endpoint, params).await
    }

    /// `{season}/date/{YYYYMMDD}/{resource}`
    pub fn dated_endpoint(&self, date: NaiveDate, resource: &str) -> String {
        format!("{}/date/{}/{}", self.season, date.format("%Y%m%d"), resource)
    }

    async fn fetch_body(&self, endpoint: &str, params: &QueryParams) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let pairs = params.to_pairs();

        tracing::debug!(endpoint = %endpoint, params = ?pairs, "Fetching from provider");

        self.retry_request(endpoint, || self.send_once(&url, &pairs))
            .await
            .map_err(SyncError::Api)
    }

    async fn send_once(
        &self,
        url: &str,
        pairs: &[(String, String)],
    ) -> std::result::Result<String, ApiError> {
        self.limiter.acquire().await;

        let resp = self
            .client
            .get(url)
            .header("Authorization", self.auth_header.expose_secret().to_string())
            .header("Accept", "application/json")
            .query(pairs)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connect"
                } else {
                    "request"
                };
                ApiError::new(ApiErrorCode::Unknown, e.to_string()).with_details(kind)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = status
                .canonical_reason()
                .unwrap_or("Unexpected status")
                .to_string();
            let mut error = ApiError::new(ApiErrorCode::Status(status.as_u16()), message);
            if !body.is_empty() {
                error = error.with_details(body.chars().take(MAX_ERROR_BODY).collect::<String>());
            }
            return Err(error);
        }

        resp.text().await.map_err(|e| {
            ApiError::new(ApiErrorCode::Unknown, format!("Failed to read response body: {e}"))
        })
    }

    /// Retries `operation` with exponential backoff
    ///
    /// The operation runs at most `max_retry_attempts + 1` times. The wait
    /// before retry `n` (counting from 0) is `base_delay_ms * 2^n`.
    async fn retry_request<F, T, Fut>(
        &self,
        endpoint: &str,
        operation: F,
    ) -> std::result::Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, ApiError>>,
    {
        let max_retries = self.retry.max_retry_attempts;
        let mut attempt: u32 = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt >= max_retries {
                        tracing::error!(
                            endpoint = %endpoint,
                            attempts = attempt + 1,
                            code = %e.code,
                            error = %e.message,
                            "Provider request failed after retries"
                        );
                        return Err(e);
                    }

                    if !self.retry.retry_client_errors && e.code.is_client_error() {
                        tracing::warn!(
                            endpoint = %endpoint,
                            code = %e.code,
                            "Not retrying client error"
                        );
                        return Err(e);
                    }

                    let delay_ms = self
                        .retry
                        .base_delay_ms
                        .saturating_mul(2u64.saturating_pow(attempt));
                    crate::log_retry_attempt!(endpoint, attempt + 1, max_retries, delay_ms, e);

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    attempt += 1;
                }
            }
        }
    }
}
