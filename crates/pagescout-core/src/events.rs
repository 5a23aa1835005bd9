//! ScrapeEvent enum — broadcast from the scraper and contact finder to frontends
//! via tokio::broadcast.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the progress channel; slow subscribers see `Lagged`.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Progress events. Timestamps are RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ScrapeEvent {
    /// A result page is about to be fetched
    #[serde(rename = "page_started")]
    PageStarted { page: u32, timestamp: String },

    /// A result page was parsed and its listings saved
    #[serde(rename = "page_scraped")]
    PageScraped {
        page: u32,
        listings: usize,
        max_page: u32,
        timestamp: String,
    },

    /// The page had no listing cards
    #[serde(rename = "no_listings")]
    NoListings { page: u32, timestamp: String },

    /// A website yielded contact info
    #[serde(rename = "site_processed")]
    SiteProcessed {
        website: String,
        emails: usize,
        social_links: usize,
        timestamp: String,
    },

    /// A website was dropped (unreachable, no contacts, nothing verified)
    #[serde(rename = "site_skipped")]
    SiteSkipped {
        website: String,
        reason: String,
        timestamp: String,
    },

    /// A pipeline finished writing its output file
    #[serde(rename = "finished")]
    Finished {
        path: PathBuf,
        records: usize,
        timestamp: String,
    },
}

impl ScrapeEvent {
    /// Serialize to `{"event": "...", "data": {...}}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// One-line human readable rendering for terminals.
    pub fn describe(&self) -> String {
        match self {
            ScrapeEvent::PageStarted { page, .. } => format!("Scraping data for page {page}..."),
            ScrapeEvent::PageScraped {
                page,
                listings,
                max_page,
                ..
            } => format!("Page {page}/{max_page} scraped successfully ({listings} listings)."),
            ScrapeEvent::NoListings { page, .. } => format!("No listings found on page {page}."),
            ScrapeEvent::SiteProcessed {
                website,
                emails,
                social_links,
                ..
            } => format!("Finished processing: {website} ({emails} emails, {social_links} social links)"),
            ScrapeEvent::SiteSkipped {
                website, reason, ..
            } => format!("Skipped {website}: {reason}"),
            ScrapeEvent::Finished { path, records, .. } => {
                format!("Wrote {records} records to {}", path.display())
            }
        }
    }
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Send without caring whether anyone is listening.
pub(crate) fn emit(tx: &broadcast::Sender<ScrapeEvent>, event: ScrapeEvent) {
    let _ = tx.send(event);
}
