use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::{AppError, Context, Result};
use crate::fetch::rewrite::RewriteRule;
use crate::market::PriceRange;

use super::Config;

/// On-disk settings; every field is optional and overrides the built-in default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    api_base: Option<String>,
    server_url: Option<String>,
    cooldown_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    default_range: Option<PriceRange>,
    news_limit: Option<u32>,
    error_rewrites: Option<Vec<RewriteRule>>,
}

pub fn apply_file(config: &mut Config, path: &Path) -> Result<()> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    apply_json(config, &json)
        .map_err(|err| AppError::Config(format!("{}: {}", path.display(), err)))
}

pub fn apply_json(config: &mut Config, json: &str) -> Result<()> {
    let raw: RawConfig = serde_json::from_str(json)?;

    if let Some(base) = raw.api_base {
        config.api_base = base;
    }
    if let Some(server) = raw.server_url {
        config.server_url = server;
    }
    if let Some(millis) = raw.cooldown_ms {
        config.cooldown = Duration::from_millis(millis);
    }
    if let Some(secs) = raw.request_timeout_secs {
        if secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(range) = raw.default_range {
        config.default_range = range;
    }
    if raw.news_limit.is_some() {
        config.news_limit = raw.news_limit;
    }
    if let Some(rules) = raw.error_rewrites {
        if let Some(rule) = rules.iter().find(|rule| rule.pattern.trim().is_empty()) {
            return Err(AppError::Config(format!(
                "rewrite rule for `{}` has an empty pattern",
                rule.replacement
            )));
        }
        config.error_rewrites = rules;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_present_fields() {
        let mut config = Config::builtin();

        apply_json(
            &mut config,
            r#"{"server_url": "http://10.0.0.5:8000", "default_range": "1W", "cooldown_ms": 1500}"#,
        )
        .unwrap();

        assert_eq!(config.resolved_api_base(), "http://10.0.0.5:8000/api/v1");
        assert_eq!(config.default_range, PriceRange::OneWeek);
        assert_eq!(config.cooldown, Duration::from_millis(1500));
        assert_eq!(config.news_limit, None);
        assert_eq!(config.error_rewrites.len(), 3);
    }

    #[test]
    fn replaces_rewrite_table() {
        let mut config = Config::builtin();

        apply_json(
            &mut config,
            r#"{"error_rewrites": [{"pattern": "quota", "replacement": "Out of quota."}]}"#,
        )
        .unwrap();

        assert_eq!(config.error_rewrites.len(), 1);
        assert_eq!(config.error_rewrites[0].envelope, None);
    }

    #[test]
    fn rejects_unknown_keys_and_empty_patterns() {
        let mut config = Config::builtin();
        assert!(apply_json(&mut config, r#"{"cooldown": 5}"#).is_err());
        assert!(apply_json(
            &mut config,
            r#"{"error_rewrites": [{"pattern": " ", "replacement": "x"}]}"#
        )
        .is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut config = Config::builtin();
        let err = apply_file(&mut config, Path::new("/nonexistent/market-lens.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
