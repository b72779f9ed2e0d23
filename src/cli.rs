use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::market::{
    stats, AskResponse, HealthResponse, NewsResponse, PriceRange, PriceStats, PricesResponse,
};
use crate::utils::format_published_at;

#[derive(Parser, Debug)]
#[command(name = "market-lens")]
#[command(about = "Terminal dashboard for price action, curated news and ticker Q&A")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// JSON config file layered over the built-in defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, overriding config and environment
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Print raw JSON instead of the text summary
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive dashboard (default)
    Dashboard,

    /// Fetch daily prices and print the derived stats
    Prices {
        ticker: String,

        #[arg(short, long, default_value = "1M")]
        range: PriceRange,
    },

    /// Fetch the curated news digest
    News {
        ticker: String,

        /// Number of articles, 1 to 10
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Ask a question about a ticker
    Ask {
        ticker: String,

        question: String,

        #[arg(short, long, default_value = "1M")]
        range: PriceRange,
    },

    /// Check that the backend is reachable
    Health,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Dashboard)
    }
}

pub fn prices_report(prices: &PricesResponse) -> Vec<String> {
    let mut lines = vec![format!(
        "{} · {} · {} daily closes",
        prices.ticker,
        prices.range,
        prices.points.len()
    )];

    match PriceStats::from_points(&prices.points) {
        Some(figures) => {
            lines.push(format!(
                "  Last close:  {}",
                stats::format_price(figures.latest_close)
            ));
            lines.push(format!(
                "  Day change:  {} {}",
                stats::format_change(figures.change),
                stats::format_change_pct(figures.change_pct)
            ));
            lines.push(format!(
                "  Range high:  {}",
                stats::format_price(figures.range_high)
            ));
            lines.push(format!(
                "  Range low:   {}",
                stats::format_price(figures.range_low)
            ));
        }
        None => lines.push("  No price points returned for this range.".to_string()),
    }

    lines
}

pub fn news_report(news: &NewsResponse) -> Vec<String> {
    let mut lines = vec![format!("{} · Curated news", news.ticker), news.summary.clone()];
    if news.articles.is_empty() {
        lines.push("No articles returned.".to_string());
    }

    for (index, article) in news.articles.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("{}. {}", index + 1, article.title));
        let mut meta = format!(
            "   {} - Score {:.2}",
            article.source.as_deref().unwrap_or("Source"),
            article.relevance_score
        );
        if let Some(published) = &article.published_at {
            meta.push_str(" · ");
            meta.push_str(&format_published_at(published));
        }
        lines.push(meta);
        if let Some(snippet) = article.summary.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            lines.push(format!("   {}", snippet));
        }
        lines.push(format!("   {}", article.url));
    }

    lines
}

pub fn answer_report(answer: &AskResponse) -> Vec<String> {
    let mut lines = vec![
        format!("{} · Q: {}", answer.ticker, answer.question),
        answer.answer.clone(),
    ];
    if !answer.sources.is_empty() {
        lines.push(format!("Sources: {}", answer.sources.join(", ")));
    }
    lines
}

pub fn health_report(base: &str, health: &HealthResponse) -> Vec<String> {
    vec![format!("{} → {}", base, health.status)]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
