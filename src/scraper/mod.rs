mod parse;
mod scraper;
mod scraper_error;

pub use parse::{parse_count, parse_move_in_dates};
pub use scraper::{RetryPolicy, Scraper, SuumoScraper};
pub use scraper_error::ScraperError;
