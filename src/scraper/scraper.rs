// scraper.rs
use crate::domain::snapshot::{MoveInBreakdown, Property, PropertyData};
use crate::scraper::parse::{parse_count, parse_move_in_dates};
use crate::scraper::ScraperError;
use rand::Rng;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use scraper::Html;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Produces one snapshot per property, in input order. Failures are
/// reported inside the snapshot, never as an error of the whole batch.
pub trait Scraper {
    fn fetch_all(&self, properties: &[Property]) -> Vec<PropertyData>;
}

/// How hard to try before giving up on a page.
///
/// HTTP failures are retried with linear backoff plus jitter. A page that
/// loads but shows zero listings is fetched once more after a pause, since
/// an empty counter is usually a render hiccup rather than an empty building.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u64,
    pub max_backoff_secs: u64,
    pub jitter_max_secs: u64,
    pub zero_count_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_backoff_secs: 10,
            jitter_max_secs: 2,
            zero_count_delay: Duration::from_secs(5),
        }
    }
}

pub struct SuumoScraper {
    client: Client,
    retry: RetryPolicy,
}

impl SuumoScraper {
    pub fn new(retry: RetryPolicy) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ja,en;q=0.8"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScraperError::Config(e.to_string()))?;

        Ok(Self { client, retry })
    }

    pub fn fetch_property(&self, property: &Property) -> PropertyData {
        info!("📄 Fetching {}", property.name);

        let result = self.scrape(&property.url).and_then(|(count, breakdown)| {
            if count > 0 {
                return Ok((count, breakdown));
            }
            warn!(
                "🔁 {} reported 0 listings, retrying in {:?}",
                property.name, self.retry.zero_count_delay
            );
            std::thread::sleep(self.retry.zero_count_delay);
            self.scrape(&property.url)
        });

        match result {
            Ok((count, breakdown)) => {
                let data = PropertyData::fetched(property, count, breakdown);
                info!(
                    "✅ {}: {count} listings, {} move-in cells",
                    property.name,
                    data.breakdown_total()
                );
                data
            }
            Err(e) => {
                error!("❌ {} failed: {e}", property.name);
                PropertyData::failed(property, e.to_string())
            }
        }
    }

    fn scrape(&self, url: &str) -> Result<(u32, MoveInBreakdown), ScraperError> {
        let html = self.fetch_html(url)?;
        let document = Html::parse_document(&html);
        Ok((parse_count(&document)?, parse_move_in_dates(&document)?))
    }

    pub fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let mut last_err = None;

        for attempt in 1..=self.retry.max_attempts {
            let start = Instant::now();

            match self.try_fetch_html(url) {
                Ok(html) => return Ok(html),
                Err(e) => {
                    warn!(
                        "⚠️ Attempt {attempt} for {url} failed in {:?}: {e}",
                        start.elapsed()
                    );
                    last_err = Some(e);

                    if attempt < self.retry.max_attempts {
                        let base = std::cmp::min(2 * attempt, self.retry.max_backoff_secs);
                        let jitter = rand::thread_rng().gen_range(0..=self.retry.jitter_max_secs);
                        std::thread::sleep(Duration::from_secs(base + jitter));
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ScraperError::Network("retry loop made no attempts".into())))
    }

    fn try_fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus(status.as_u16()));
        }

        resp.text()
            .map_err(|e| ScraperError::Network(e.to_string()))
    }
}

impl Scraper for SuumoScraper {
    /// One scoped thread per property; results are collected in input order.
    fn fetch_all(&self, properties: &[Property]) -> Vec<PropertyData> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = properties
                .iter()
                .map(|p| scope.spawn(move || self.fetch_property(p)))
                .collect();

            handles
                .into_iter()
                .zip(properties)
                .map(|(handle, p)| {
                    handle
                        .join()
                        .unwrap_or_else(|_| PropertyData::failed(p, "fetch thread panicked"))
                })
                .collect()
        })
    }
}
