// src/scraper/parse.rs

use crate::domain::category::{DatedLabel, IMMEDIATE, NEGOTIABLE};
use crate::domain::snapshot::MoveInBreakdown;
use crate::scraper::ScraperError;
use scraper::{Html, Selector};

/// Listing count shown on a building's library page.
const COUNT_SELECTOR: &str = "span.fgOrange.bld";

/// Reads the headline listing count. A page without the counter is treated
/// as zero listings, matching what the site renders for empty buildings.
pub fn parse_count(document: &Html) -> Result<u32, ScraperError> {
    let selector =
        Selector::parse(COUNT_SELECTOR).map_err(|e| ScraperError::HtmlParse(e.to_string()))?;

    let count = document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .and_then(|text| text.trim().replace(',', "").parse::<u32>().ok())
        .unwrap_or(0);

    Ok(count)
}

/// Tallies every table cell that looks like a move-in date.
pub fn parse_move_in_dates(document: &Html) -> Result<MoveInBreakdown, ScraperError> {
    let selector = Selector::parse("td").map_err(|e| ScraperError::HtmlParse(e.to_string()))?;

    let mut breakdown = MoveInBreakdown::new();

    for cell in document.select(&selector) {
        let text: String = cell
            .text()
            .flat_map(str::chars)
            .filter(|c| !c.is_whitespace())
            .collect();

        if let Some(key) = move_in_key(&text) {
            *breakdown.entry(key).or_insert(0) += 1;
        }
    }

    Ok(breakdown)
}

fn move_in_key(cell: &str) -> Option<String> {
    match cell {
        "即入居可" | "即" => Some(IMMEDIATE.to_string()),
        "相談" => Some(NEGOTIABLE.to_string()),
        other => DatedLabel::parse(other).map(|d| d.key()),
    }
}
