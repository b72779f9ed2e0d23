use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::{AppError, Context, Result};
use crate::market::{
    AskRequest, AskResponse, HealthResponse, NewsResponse, PriceRange, PricesResponse,
};
use crate::utils::normalize_ticker;

use super::rewrite::ErrorRewrites;

/// Seam between the dashboard session and the backend, so flows can run against a fake.
pub trait MarketApi: Send + Sync + 'static {
    fn prices(&self, ticker: &str, range: PriceRange) -> BoxFuture<'static, Result<PricesResponse>>;
    fn news(&self, ticker: &str) -> BoxFuture<'static, Result<NewsResponse>>;
    fn ask(&self, request: AskRequest) -> BoxFuture<'static, Result<AskResponse>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Prices,
    News,
    Ask,
    Health,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Prices => "prices",
            Endpoint::News => "news",
            Endpoint::Ask => "ask",
            Endpoint::Health => "health",
        }
    }

    /// Shown when the failure carries no usable `detail`.
    fn fallback_message(self) -> &'static str {
        match self {
            Endpoint::Prices => "Failed to load prices",
            Endpoint::News => "Failed to load news",
            Endpoint::Ask => "Failed to get answer",
            Endpoint::Health => "Health check failed",
        }
    }
}

/// HTTP client for the `/prices`, `/news`, `/ask` and `/health` endpoints.
#[derive(Clone)]
pub struct ApiClient {
    base: String,
    http: Client,
    rewrites: Arc<ErrorRewrites>,
    news_limit: Option<u32>,
}

impl ApiClient {
    pub fn new(
        base: impl Into<String>,
        timeout: Duration,
        rewrites: ErrorRewrites,
        news_limit: Option<u32>,
    ) -> Result<Self> {
        let base = base.into().trim().trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to construct API HTTP client")?;

        debug!("API client targeting {}", base);

        Ok(Self {
            base,
            http,
            rewrites: Arc::new(rewrites),
            news_limit,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.resolved_api_base(),
            config.request_timeout,
            ErrorRewrites::new(config.error_rewrites.clone()),
            config.news_limit,
        )
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub async fn fetch_prices(&self, ticker: &str, range: PriceRange) -> Result<PricesResponse> {
        let ticker = normalize_ticker(ticker);
        let request = self
            .http
            .get(self.url(Endpoint::Prices))
            .query(&[("ticker", ticker.as_str()), ("range", range.as_str())]);
        self.execute(request, Endpoint::Prices).await
    }

    pub async fn fetch_news(&self, ticker: &str) -> Result<NewsResponse> {
        let ticker = normalize_ticker(ticker);
        let mut request = self
            .http
            .get(self.url(Endpoint::News))
            .query(&[("ticker", ticker.as_str())]);
        if let Some(limit) = self.news_limit {
            request = request.query(&[("limit", limit)]);
        }
        self.execute(request, Endpoint::News).await
    }

    pub async fn ask_question(&self, payload: &AskRequest) -> Result<AskResponse> {
        let payload = AskRequest {
            ticker: normalize_ticker(&payload.ticker),
            range: payload.range,
            question: payload.question.trim().to_string(),
        };
        let request = self.http.post(self.url(Endpoint::Ask)).json(&payload);
        self.execute(request, Endpoint::Ask).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let request = self.http.get(self.url(Endpoint::Health));
        self.execute(request, Endpoint::Health).await
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base, endpoint.path())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: Endpoint,
    ) -> Result<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("{} request could not be completed: {}", endpoint.path(), err);
                return Err(AppError::api(None, endpoint.fallback_message()));
            }
        };

        let status = response.status();
        debug!("{} responded with {}", endpoint.path(), status);

        if !status.is_success() {
            let body = match response.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(err) => {
                    warn!("Failed to read {} error body: {}", endpoint.path(), err);
                    Vec::new()
                }
            };
            let message = error_message(&body, &self.rewrites, endpoint.fallback_message());
            return Err(AppError::api(Some(status), message));
        }

        response.json::<T>().await.map_err(|err| {
            warn!("Failed to decode {} response: {}", endpoint.path(), err);
            AppError::api(Some(status), endpoint.fallback_message())
        })
    }
}

/// Extract a string `detail` from an error body and normalize it, or fall back.
pub fn error_message(body: &[u8], rewrites: &ErrorRewrites, fallback: &str) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|root| root.get("detail").and_then(Value::as_str).map(str::to_string))
        .map(|detail| rewrites.normalize(&detail).into_owned())
        .unwrap_or_else(|| fallback.to_string())
}

impl MarketApi for ApiClient {
    fn prices(&self, ticker: &str, range: PriceRange) -> BoxFuture<'static, Result<PricesResponse>> {
        let client = self.clone();
        let ticker = ticker.to_string();
        async move { client.fetch_prices(&ticker, range).await }.boxed()
    }

    fn news(&self, ticker: &str) -> BoxFuture<'static, Result<NewsResponse>> {
        let client = self.clone();
        let ticker = ticker.to_string();
        async move { client.fetch_news(&ticker).await }.boxed()
    }

    fn ask(&self, request: AskRequest) -> BoxFuture<'static, Result<AskResponse>> {
        let client = self.clone();
        async move { client.ask_question(&request).await }.boxed()
    }
}
