use crate::error::Result;
use crate::market::{AskResponse, ChartData, NewsResponse, PriceRange, PriceStats, PricesResponse};

/// An accepted prices response plus everything derived from it.
///
/// Stats and chart data are computed once when the snapshot replaces the
/// previous one, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub response: PricesResponse,
    pub stats: Option<PriceStats>,
    pub chart: ChartData,
}

impl PriceSnapshot {
    pub fn new(response: PricesResponse) -> Self {
        let stats = PriceStats::from_points(&response.points);
        let chart = ChartData::from_prices(&response);
        Self {
            response,
            stats,
            chart,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceStatus {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Data, loading flag and inline error for one request kind.
#[derive(Debug, Clone)]
pub struct Slice<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> Slice<T> {
    pub fn status(&self) -> SliceStatus {
        if self.loading {
            SliceStatus::Loading
        } else if self.error.is_some() {
            SliceStatus::Failed
        } else if self.data.is_some() {
            SliceStatus::Succeeded
        } else {
            SliceStatus::Idle
        }
    }

    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn reject(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// A failure leaves the previous snapshot in place.
    pub(crate) fn settle(&mut self, result: Result<T>) {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Ticker,
    Question,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Ticker => Focus::Question,
            Focus::Question => Focus::Ticker,
        }
    }
}

/// Everything the render surface reads.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub ticker: String,
    pub range: PriceRange,
    pub question: String,
    pub focus: Focus,
    pub prices: Slice<PriceSnapshot>,
    pub news: Slice<NewsResponse>,
    pub answer: Slice<AskResponse>,
    pub news_scroll: usize,
}

impl DashboardState {
    pub fn new(default_range: PriceRange) -> Self {
        Self {
            range: default_range,
            ..Self::default()
        }
    }

    pub fn scroll_news(&mut self, delta: isize) {
        let max = self
            .news
            .data
            .as_ref()
            .map(|news| news.articles.len().saturating_sub(1))
            .unwrap_or(0);
        let next = self.news_scroll as isize + delta;
        self.news_scroll = next.clamp(0, max as isize) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn initial_state_is_idle_with_default_range() {
        let state = DashboardState::new(PriceRange::OneMonth);

        assert!(state.ticker.is_empty());
        assert_eq!(state.range, PriceRange::OneMonth);
        assert_eq!(state.prices.status(), SliceStatus::Idle);
        assert_eq!(state.news.status(), SliceStatus::Idle);
        assert_eq!(state.focus, Focus::Ticker);
    }

    #[test]
    fn failed_settle_keeps_previous_data() {
        let mut slice: Slice<u32> = Slice::default();
        slice.begin();
        slice.settle(Ok(7));
        assert_eq!(slice.status(), SliceStatus::Succeeded);

        slice.begin();
        assert_eq!(slice.status(), SliceStatus::Loading);
        slice.settle(Err(AppError::message("Failed to load prices")));

        assert_eq!(slice.data, Some(7));
        assert_eq!(slice.error.as_deref(), Some("Failed to load prices"));
        assert_eq!(slice.status(), SliceStatus::Failed);
    }

    #[test]
    fn news_scroll_is_clamped() {
        let mut state = DashboardState::default();
        state.scroll_news(3);
        assert_eq!(state.news_scroll, 0);

        state.news.data = Some(NewsResponse {
            ticker: "AAPL".to_string(),
            summary: String::new(),
            articles: vec![
                crate::market::NewsArticle {
                    title: "a".to_string(),
                    url: "https://a".to_string(),
                    source: None,
                    published_at: None,
                    summary: None,
                    relevance_score: 1.0,
                    relevance_reason: None,
                };
                3
            ],
        });
        state.scroll_news(5);
        assert_eq!(state.news_scroll, 2);
        state.scroll_news(-9);
        assert_eq!(state.news_scroll, 0);
    }
}
