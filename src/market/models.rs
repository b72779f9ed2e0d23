use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Historical window requested from the prices endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "1W")]
    OneWeek,
    #[default]
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "100D")]
    OneHundredDays,
}

impl PriceRange {
    pub const ALL: [PriceRange; 3] = [
        PriceRange::OneWeek,
        PriceRange::OneMonth,
        PriceRange::OneHundredDays,
    ];

    /// Wire form used in query strings and request bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            PriceRange::OneWeek => "1W",
            PriceRange::OneMonth => "1M",
            PriceRange::OneHundredDays => "100D",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|range| *range == self)
            .unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceRange {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        PriceRange::ALL
            .into_iter()
            .find(|range| range.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                AppError::Config(format!(
                    "unknown range `{}` (expected 1W, 1M or 100D)",
                    trimmed
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricesResponse {
    pub ticker: String,
    pub range: PriceRange,
    pub points: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub relevance_score: f64,
    #[serde(default)]
    pub relevance_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsResponse {
    pub ticker: String,
    pub summary: String,
    pub articles: Vec<NewsArticle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub ticker: String,
    pub range: PriceRange,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub ticker: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
