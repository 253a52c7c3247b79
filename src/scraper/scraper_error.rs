use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ScraperError {
    Network(String),
    HttpStatus(u16),
    HtmlParse(String),
    Config(String),
}

impl fmt::Display for ScraperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScraperError::Network(msg) => write!(f, "Network error: {msg}"),
            ScraperError::HttpStatus(code) => write!(f, "Unexpected HTTP status {code}"),
            ScraperError::HtmlParse(msg) => write!(f, "HTML parse error: {msg}"),
            ScraperError::Config(msg) => write!(f, "Scraper configuration error: {msg}"),
        }
    }
}

impl Error for ScraperError {}
