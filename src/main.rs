use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::debug;
use serde::Serialize;

use market_lens::app::controller::EMPTY_TICKER_MESSAGE;
use market_lens::cli::{self, Cli, Commands};
use market_lens::config::Config;
use market_lens::fetch::ApiClient;
use market_lens::market::AskRequest;
use market_lens::utils::normalize_ticker;
use market_lens::AppError;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let news_limit = match args.command() {
        Commands::News { limit, .. } => limit,
        _ => None,
    };
    config.apply_cli(args.api_base.as_deref(), news_limit);
    config.validate()?;
    debug!("Resolved API base {}", config.resolved_api_base());

    match args.command() {
        Commands::Dashboard => market_lens::app::run(config).await?,
        Commands::Prices { ticker, range } => {
            require_ticker(&ticker)?;
            let client = ApiClient::from_config(&config)?;
            let prices = client.fetch_prices(&ticker, range).await?;
            emit(args.json, &prices, || cli::prices_report(&prices))?;
        }
        Commands::News { ticker, .. } => {
            require_ticker(&ticker)?;
            let client = ApiClient::from_config(&config)?;
            let news = client.fetch_news(&ticker).await?;
            emit(args.json, &news, || cli::news_report(&news))?;
        }
        Commands::Ask {
            ticker,
            question,
            range,
        } => {
            require_ticker(&ticker)?;
            let client = ApiClient::from_config(&config)?;
            let answer = client
                .ask_question(&AskRequest {
                    ticker,
                    range,
                    question,
                })
                .await?;
            emit(args.json, &answer, || cli::answer_report(&answer))?;
        }
        Commands::Health => {
            let client = ApiClient::from_config(&config)?;
            let health = client.health().await?;
            emit(args.json, &health, || cli::health_report(client.base(), &health))?;
        }
    }

    Ok(())
}

fn require_ticker(ticker: &str) -> Result<()> {
    if normalize_ticker(ticker).is_empty() {
        return Err(AppError::message(EMPTY_TICKER_MESSAGE).into());
    }
    Ok(())
}

fn emit<T, F>(json: bool, value: &T, report: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> Vec<String>,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        cli::print_lines(&report());
    }
    Ok(())
}
