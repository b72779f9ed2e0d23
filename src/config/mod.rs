use std::path::Path;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::fetch::rewrite::{builtin_rules, RewriteRule};
use crate::market::PriceRange;

pub mod loader;

pub const DEFAULT_API_BASE: &str = "/api/v1";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_BASE: &str = "MARKET_LENS_API_BASE";
pub const ENV_SERVER_URL: &str = "MARKET_LENS_SERVER_URL";
pub const ENV_COOLDOWN_MS: &str = "MARKET_LENS_COOLDOWN_MS";
pub const ENV_NEWS_LIMIT: &str = "MARKET_LENS_NEWS_LIMIT";

/// Backend caps the news `limit` query parameter to this range.
pub const NEWS_LIMIT_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute URL or a path resolved against `server_url`.
    pub api_base: String,
    pub server_url: String,
    pub cooldown: Duration,
    pub request_timeout: Duration,
    pub default_range: PriceRange,
    pub news_limit: Option<u32>,
    pub error_rewrites: Vec<RewriteRule>,
}

impl Config {
    pub fn builtin() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            cooldown: DEFAULT_COOLDOWN,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            default_range: PriceRange::default(),
            news_limit: None,
            error_rewrites: builtin_rules(),
        }
    }

    /// Built-in defaults, then the optional JSON file, then the process environment.
    /// Not validated; run [`Config::validate`] after command-line overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::builtin();
        if let Some(path) = path {
            loader::apply_file(&mut config, path)?;
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Highest-precedence layer: flags given on the command line.
    pub fn apply_cli(&mut self, api_base: Option<&str>, news_limit: Option<u32>) {
        if let Some(base) = api_base {
            self.api_base = base.trim().to_string();
        }
        if let Some(limit) = news_limit {
            self.news_limit = Some(limit);
        }
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(base) = read(ENV_API_BASE) {
            self.api_base = base;
        }
        if let Some(server) = read(ENV_SERVER_URL) {
            self.server_url = server;
        }
        if let Some(raw) = read(ENV_COOLDOWN_MS) {
            let millis: u64 = raw.parse().map_err(|_| {
                AppError::Config(format!("{} must be a whole number of milliseconds", ENV_COOLDOWN_MS))
            })?;
            self.cooldown = Duration::from_millis(millis);
        }
        if let Some(raw) = read(ENV_NEWS_LIMIT) {
            let limit: u32 = raw.parse().map_err(|_| {
                AppError::Config(format!("{} must be a positive integer", ENV_NEWS_LIMIT))
            })?;
            self.news_limit = Some(limit);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.news_limit {
            if !NEWS_LIMIT_RANGE.contains(&limit) {
                return Err(AppError::Config(format!(
                    "news limit {} outside {}..={}",
                    limit,
                    NEWS_LIMIT_RANGE.start(),
                    NEWS_LIMIT_RANGE.end()
                )));
            }
        }
        let resolved = self.resolved_api_base();
        if !resolved.starts_with("http://") && !resolved.starts_with("https://") {
            return Err(AppError::Config(format!(
                "API base must resolve to an http(s) URL, got `{}`",
                resolved
            )));
        }
        Ok(())
    }

    /// Absolute API base without a trailing slash.
    pub fn resolved_api_base(&self) -> String {
        resolve_api_base(&self.api_base, &self.server_url)
    }
}

pub fn resolve_api_base(api_base: &str, server_url: &str) -> String {
    let base = api_base.trim();
    if base.starts_with("http://") || base.starts_with("https://") {
        return base.trim_end_matches('/').to_string();
    }

    let origin = server_url.trim().trim_end_matches('/');
    let path = base.trim_matches('/');
    if path.is_empty() {
        origin.to_string()
    } else {
        format!("{}/{}", origin, path)
    }
}
