use std::borrow::Cow;

use serde::{Deserialize, Serialize};

pub const INVALID_TICKER_MESSAGE: &str = "Invalid ticker. Please check the symbol and try again.";
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit reached. Please wait a moment and try again.";

const ALPHA_VANTAGE_ENVELOPE: &str = "Alpha Vantage error";

/// One entry of the known-error rewrite table.
///
/// A rule matches when the message contains `envelope` (if set, case-sensitive)
/// and contains `pattern` ignoring ASCII case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    #[serde(default)]
    pub envelope: Option<String>,
    pub pattern: String,
    pub replacement: String,
}

impl RewriteRule {
    pub fn new(envelope: Option<&str>, pattern: &str, replacement: &str) -> Self {
        Self {
            envelope: envelope.map(str::to_string),
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }

    fn matches(&self, message: &str, lowered: &str) -> bool {
        if let Some(envelope) = &self.envelope {
            if !message.contains(envelope.as_str()) {
                return false;
            }
        }
        !self.pattern.is_empty() && lowered.contains(&self.pattern.to_ascii_lowercase())
    }
}

/// Ordered rewrite table; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRewrites {
    rules: Vec<RewriteRule>,
}

impl Default for ErrorRewrites {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ErrorRewrites {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    /// Rules for the market-data vendor the reference backend wraps.
    pub fn builtin() -> Self {
        Self::new(builtin_rules())
    }

    pub fn normalize<'a>(&self, message: &'a str) -> Cow<'a, str> {
        let lowered = message.to_ascii_lowercase();
        match self
            .rules
            .iter()
            .find(|rule| rule.matches(message, &lowered))
        {
            Some(rule) => Cow::Owned(rule.replacement.clone()),
            None => Cow::Borrowed(message),
        }
    }
}

pub fn builtin_rules() -> Vec<RewriteRule> {
    vec![
        RewriteRule::new(
            Some(ALPHA_VANTAGE_ENVELOPE),
            "invalid api call",
            INVALID_TICKER_MESSAGE,
        ),
        RewriteRule::new(
            Some(ALPHA_VANTAGE_ENVELOPE),
            "thank you for using alpha vantage",
            RATE_LIMIT_MESSAGE,
        ),
        RewriteRule::new(
            Some(ALPHA_VANTAGE_ENVELOPE),
            "rate limit",
            RATE_LIMIT_MESSAGE,
        ),
    ]
}
