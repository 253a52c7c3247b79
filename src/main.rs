use crate::cli::{parse_args, run};
use crate::config::AppConfig;
use anyhow::{anyhow, Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod cycles;
mod dashboard;
mod db;
mod domain;
mod errors;
mod mailer;
mod notify;
mod responses;
mod router;
mod scraper;
mod spreadsheets;
mod store;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("suumo_tracker=info")),
        )
        .with_target(false)
        .init();

    if let Err(e) = try_main() {
        error!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let command = parse_args(std::env::args().skip(1))?;
    let config = AppConfig::from_env().map_err(|e| anyhow!("configuration error: {e}"))?;
    run(command, &config)
}
