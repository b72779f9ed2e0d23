use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use log::debug;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::app::gate::{RequestGate, RequestKind};
use crate::app::state::{DashboardState, PriceSnapshot};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::MarketApi;
use crate::market::{AskRequest, AskResponse, NewsResponse, PricesResponse};
use crate::utils::normalize_ticker;

pub const EMPTY_TICKER_MESSAGE: &str = "Enter a ticker symbol first.";
pub const EMPTY_QUESTION_MESSAGE: &str = "Type a question first.";

/// A finished request, routed back to the one slice it belongs to.
#[derive(Debug)]
pub enum Settled {
    Prices(Result<PricesResponse>),
    News(Result<NewsResponse>),
    Answer(Result<AskResponse>),
}

impl Settled {
    pub fn kind(&self) -> RequestKind {
        match self {
            Settled::Prices(_) => RequestKind::Prices,
            Settled::News(_) => RequestKind::News,
            Settled::Answer(_) => RequestKind::Ask,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Issued,
    /// Dropped because the same kind is still loading.
    Ignored,
    Rejected(String),
}

/// One dashboard session: UI state, its request gate, and the API it talks to.
pub struct Dashboard {
    state: DashboardState,
    gate: RequestGate,
    api: Arc<dyn MarketApi>,
    tx: UnboundedSender<Settled>,
    rx: UnboundedReceiver<Settled>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn MarketApi>, config: &Config) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: DashboardState::new(config.default_range),
            gate: RequestGate::new(config.cooldown),
            api,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DashboardState {
        &mut self.state
    }

    pub fn in_flight(&self) -> bool {
        self.state.prices.loading || self.state.news.loading || self.state.answer.loading
    }

    pub fn submit_prices(&mut self, now: Instant) -> Submission {
        if self.state.prices.loading {
            return Submission::Ignored;
        }
        let ticker = normalize_ticker(&self.state.ticker);
        if ticker.is_empty() {
            self.state.prices.reject(EMPTY_TICKER_MESSAGE);
            return Submission::Rejected(EMPTY_TICKER_MESSAGE.to_string());
        }
        if let Err(err) = self.gate.try_acquire(RequestKind::Prices, now) {
            let message = err.to_string();
            self.state.prices.reject(message.clone());
            return Submission::Rejected(message);
        }

        let range = self.state.range;
        debug!("Requesting {} prices for {}", range, ticker);
        self.state.prices.begin();
        let request = self.api.prices(&ticker, range);
        self.spawn(request, Settled::Prices);
        Submission::Issued
    }

    pub fn request_news(&mut self, now: Instant) -> Submission {
        if self.state.news.loading {
            return Submission::Ignored;
        }
        let ticker = normalize_ticker(&self.state.ticker);
        if ticker.is_empty() {
            self.state.news.reject(EMPTY_TICKER_MESSAGE);
            return Submission::Rejected(EMPTY_TICKER_MESSAGE.to_string());
        }
        if let Err(err) = self.gate.try_acquire(RequestKind::News, now) {
            let message = err.to_string();
            self.state.news.reject(message.clone());
            return Submission::Rejected(message);
        }

        debug!("Requesting news for {}", ticker);
        self.state.news.begin();
        let request = self.api.news(&ticker);
        self.spawn(request, Settled::News);
        Submission::Issued
    }

    pub fn submit_question(&mut self, now: Instant) -> Submission {
        if self.state.answer.loading {
            return Submission::Ignored;
        }
        let ticker = normalize_ticker(&self.state.ticker);
        let question = self.state.question.trim().to_string();
        let missing = if ticker.is_empty() {
            Some(EMPTY_TICKER_MESSAGE)
        } else if question.is_empty() {
            Some(EMPTY_QUESTION_MESSAGE)
        } else {
            None
        };
        if let Some(message) = missing {
            self.state.answer.reject(message);
            return Submission::Rejected(message.to_string());
        }
        if let Err(err) = self.gate.try_acquire(RequestKind::Ask, now) {
            let message = err.to_string();
            self.state.answer.reject(message.clone());
            return Submission::Rejected(message);
        }

        debug!("Asking about {}: {}", ticker, question);
        self.state.answer.begin();
        let request = self.api.ask(AskRequest {
            ticker,
            range: self.state.range,
            question,
        });
        self.spawn(request, Settled::Answer);
        Submission::Issued
    }

    /// Apply every outcome that has already arrived; returns how many.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.rx.try_recv() {
                Ok(settled) => {
                    self.apply(settled);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Wait for the next outcome and apply it.
    pub async fn settle_next(&mut self) -> Option<RequestKind> {
        let settled = self.rx.recv().await?;
        let kind = settled.kind();
        self.apply(settled);
        Some(kind)
    }

    /// Update exactly the slice the outcome belongs to.
    pub fn apply(&mut self, settled: Settled) {
        match settled {
            Settled::Prices(result) => {
                self.state.prices.settle(result.map(PriceSnapshot::new));
            }
            Settled::News(result) => {
                let replaced = result.is_ok();
                self.state.news.settle(result);
                if replaced {
                    self.state.news_scroll = 0;
                }
            }
            Settled::Answer(result) => self.state.answer.settle(result),
        }
    }

    fn spawn<T>(&self, request: BoxFuture<'static, Result<T>>, wrap: fn(Result<T>) -> Settled)
    where
        T: Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = request.await;
            let _ = tx.send(wrap(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::SliceStatus;
    use crate::error::AppError;
    use crate::market::{NewsArticle, PricePoint, PriceRange};
    use chrono::NaiveDate;
    use futures::future::FutureExt;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct FakeApi {
        price_calls: AtomicUsize,
        news_calls: AtomicUsize,
        ask_calls: AtomicUsize,
        fail_prices: AtomicBool,
    }

    impl MarketApi for FakeApi {
        fn prices(
            &self,
            ticker: &str,
            range: PriceRange,
        ) -> BoxFuture<'static, Result<PricesResponse>> {
            self.price_calls.fetch_add(1, Ordering::SeqCst);
            let result = if self.fail_prices.load(Ordering::SeqCst) {
                Err(AppError::api(None, "Failed to load prices"))
            } else {
                Ok(sample_prices(ticker, range))
            };
            async move { result }.boxed()
        }

        fn news(&self, ticker: &str) -> BoxFuture<'static, Result<NewsResponse>> {
            self.news_calls.fetch_add(1, Ordering::SeqCst);
            let response = NewsResponse {
                ticker: ticker.to_string(),
                summary: format!("Top {} headlines summarized.", ticker),
                articles: vec![NewsArticle {
                    title: format!("{} rallies", ticker),
                    url: "https://news.example/1".to_string(),
                    source: Some("Wire".to_string()),
                    published_at: None,
                    summary: None,
                    relevance_score: 1.0,
                    relevance_reason: None,
                }],
            };
            async move { Ok(response) }.boxed()
        }

        fn ask(&self, request: AskRequest) -> BoxFuture<'static, Result<AskResponse>> {
            self.ask_calls.fetch_add(1, Ordering::SeqCst);
            let response = AskResponse {
                ticker: request.ticker,
                question: request.question,
                answer: "Momentum.".to_string(),
                sources: Vec::new(),
            };
            async move { Ok(response) }.boxed()
        }
    }

    fn sample_prices(ticker: &str, range: PriceRange) -> PricesResponse {
        let point = |day: u32, high: f64, low: f64, close: f64| PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 100,
        };
        PricesResponse {
            ticker: ticker.to_string(),
            range,
            points: vec![point(1, 105.0, 99.0, 100.0), point(2, 108.0, 101.0, 106.0)],
        }
    }

    fn dashboard(api: Arc<FakeApi>) -> Dashboard {
        let mut dashboard = Dashboard::new(api, &Config::builtin());
        dashboard.state_mut().ticker = "aapl".to_string();
        dashboard
    }

    #[tokio::test]
    async fn second_price_request_inside_cooldown_is_rejected() {
        let api = Arc::new(FakeApi::default());
        let mut dashboard = dashboard(api.clone());
        let start = Instant::now();

        assert_eq!(dashboard.submit_prices(start), Submission::Issued);
        dashboard.settle_next().await;
        let second = dashboard.submit_prices(start + Duration::from_millis(500));

        assert_eq!(
            second,
            Submission::Rejected("Please wait 1s before requesting prices again.".to_string())
        );
        assert_eq!(api.price_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            dashboard.state().prices.error.as_deref(),
            Some("Please wait 1s before requesting prices again.")
        );
        assert!(dashboard.state().prices.data.is_some());
    }

    #[tokio::test]
    async fn price_and_news_cooldowns_are_independent() {
        let api = Arc::new(FakeApi::default());
        let mut dashboard = dashboard(api.clone());
        let start = Instant::now();

        assert_eq!(dashboard.submit_prices(start), Submission::Issued);
        assert_eq!(
            dashboard.request_news(start + Duration::from_millis(100)),
            Submission::Issued
        );
        dashboard.settle_next().await;
        dashboard.settle_next().await;

        assert_eq!(api.price_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.news_calls.load(Ordering::SeqCst), 1);
        assert_eq!(dashboard.state().prices.status(), SliceStatus::Succeeded);
        assert_eq!(dashboard.state().news.status(), SliceStatus::Succeeded);
    }

    #[tokio::test]
    async fn snapshot_carries_derived_stats_and_chart() {
        let api = Arc::new(FakeApi::default());
        let mut dashboard = dashboard(api);

        dashboard.submit_prices(Instant::now());
        assert_eq!(dashboard.settle_next().await, Some(RequestKind::Prices));

        let snapshot = dashboard.state().prices.data.as_ref().unwrap();
        assert_eq!(snapshot.response.ticker, "AAPL");
        let stats = snapshot.stats.unwrap();
        assert!((stats.change.unwrap() - 6.0).abs() < 1e-9);
        assert_eq!(snapshot.chart.series.values, vec![100.0, 106.0]);
        assert!(dashboard.state().news.data.is_none());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_snapshot() {
        let api = Arc::new(FakeApi::default());
        let mut dashboard = dashboard(api.clone());
        let start = Instant::now();
        dashboard.submit_prices(start);
        dashboard.settle_next().await;

        api.fail_prices.store(true, Ordering::SeqCst);
        assert_eq!(
            dashboard.submit_prices(start + Duration::from_millis(1001)),
            Submission::Issued
        );
        assert!(dashboard.state().prices.loading);
        assert!(dashboard.state().prices.error.is_none());
        dashboard.settle_next().await;

        let prices = &dashboard.state().prices;
        assert!(!prices.loading);
        assert_eq!(prices.error.as_deref(), Some("Failed to load prices"));
        assert!(prices.data.is_some());
    }

    #[tokio::test]
    async fn loading_slice_ignores_resubmission() {
        let api = Arc::new(FakeApi::default());
        let mut dashboard = dashboard(api.clone());
        let start = Instant::now();

        dashboard.submit_prices(start);
        let again = dashboard.submit_prices(start + Duration::from_secs(5));

        assert_eq!(again, Submission::Ignored);
        assert_eq!(api.price_calls.load(Ordering::SeqCst), 1);
        assert!(dashboard.in_flight());
    }

    #[tokio::test]
    async fn empty_ticker_is_rejected_before_the_gate() {
        let api = Arc::new(FakeApi::default());
        let mut dashboard = Dashboard::new(api.clone(), &Config::builtin());
        let now = Instant::now();

        assert_eq!(
            dashboard.request_news(now),
            Submission::Rejected(EMPTY_TICKER_MESSAGE.to_string())
        );
        dashboard.state_mut().ticker = "msft".to_string();

        assert_eq!(dashboard.request_news(now), Submission::Issued);
        assert_eq!(api.news_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn question_flow_fills_answer_slice_only() {
        let api = Arc::new(FakeApi::default());
        let mut dashboard = dashboard(api.clone());
        let now = Instant::now();

        assert_eq!(
            dashboard.submit_question(now),
            Submission::Rejected(EMPTY_QUESTION_MESSAGE.to_string())
        );
        dashboard.state_mut().question = "Why up?".to_string();
        assert_eq!(dashboard.submit_question(now), Submission::Issued);
        assert_eq!(dashboard.settle_next().await, Some(RequestKind::Ask));

        let answer = dashboard.state().answer.data.as_ref().unwrap();
        assert_eq!(answer.ticker, "AAPL");
        assert_eq!(answer.answer, "Momentum.");
        assert!(dashboard.state().prices.data.is_none());
        assert!(dashboard.state().news.data.is_none());
    }

    #[tokio::test]
    async fn drain_applies_arrived_outcomes() {
        let api = Arc::new(FakeApi::default());
        let mut dashboard = dashboard(api);

        dashboard.request_news(Instant::now());
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        assert_eq!(dashboard.drain(), 1);
        assert!(dashboard.state().news.data.is_some());
        assert!(!dashboard.in_flight());
    }
}
