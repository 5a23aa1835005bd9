//! Directory search scraper — walks every result page for a query and appends
//! the listings to a CSV file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use reqwest::{Client, Url};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::events::{self, ScrapeEvent, EVENT_CHANNEL_CAPACITY};
use crate::http::{build_client, fetch_page};
use crate::listing::{max_page, parse_results_page};
use crate::output::append_listings;
use crate::types::{ScrapeSummary, SearchQuery};

/// Characters that are not allowed in a file name on at least one common platform.
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Result page URL, form-encoded (spaces become '+').
pub fn search_url(base_url: &str, query: &SearchQuery, page: u32) -> Result<Url> {
    let endpoint = format!("{}/search", base_url.trim_end_matches('/'));
    let page = page.to_string();
    Url::parse_with_params(
        &endpoint,
        &[
            ("search_terms", query.search_terms.as_str()),
            ("geo_location_terms", query.geo_location_terms.as_str()),
            ("page", page.as_str()),
        ],
    )
    .map_err(|e| ScrapeError::InvalidUrl {
        url: endpoint.clone(),
        reason: e.to_string(),
    })
}

/// Strip characters that cannot appear in a file name.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !INVALID_FILENAME_CHARS.contains(c))
        .collect();
    let cleaned = cleaned.trim().trim_end_matches('.').trim_end();
    if cleaned.is_empty() {
        "results".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `{output_dir}/{search_terms}{geo_location_terms}.csv`
pub fn output_path(output_dir: &Path, query: &SearchQuery) -> PathBuf {
    let stem = sanitize_filename(&format!(
        "{}{}",
        query.search_terms, query.geo_location_terms
    ));
    output_dir.join(format!("{stem}.csv"))
}

pub struct YellowPageScraper {
    config: Config,
    query: SearchQuery,
    client: Client,
    file_path: PathBuf,
    current_page: u32,
    max_page: u32,
    event_tx: broadcast::Sender<ScrapeEvent>,
}

impl YellowPageScraper {
    pub fn new(config: Config, query: SearchQuery) -> Result<Self> {
        let client = build_client(&config, config.page_timeout())?;
        let file_path = output_path(&config.output_dir, &query);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            current_page: query.start_page,
            max_page: 1,
            config,
            query,
            client,
            file_path,
            event_tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScrapeEvent> {
        self.event_tx.subscribe()
    }

    /// Where listings are appended.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Fetch and parse one page, appending its listings. Returns how many
    /// listings it held.
    async fn scrape_page(&mut self) -> Result<usize> {
        let url = search_url(self.config.base_url(), &self.query, self.current_page)?;
        let html = fetch_page(&self.client, url.as_str()).await?;
        let page = parse_results_page(&html, self.config.base_url());

        self.max_page = max_page(
            page.result_count,
            self.current_page,
            self.config.results_per_page,
        );
        debug!(
            "Page {}: {} listings, max page {}",
            self.current_page,
            page.listings.len(),
            self.max_page
        );

        if page.listings.is_empty() {
            info!("No listings found on page {}.", self.current_page);
            events::emit(
                &self.event_tx,
                ScrapeEvent::NoListings {
                    page: self.current_page,
                    timestamp: events::now(),
                },
            );
            return Ok(0);
        }

        append_listings(&self.file_path, &page.listings)?;
        events::emit(
            &self.event_tx,
            ScrapeEvent::PageScraped {
                page: self.current_page,
                listings: page.listings.len(),
                max_page: self.max_page,
                timestamp: events::now(),
            },
        );
        Ok(page.listings.len())
    }

    async fn pause_between_pages(&self) {
        if self.config.page_delay_ms == 0 {
            return;
        }
        let ms = rand::thread_rng().gen_range(0..=self.config.page_delay_ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Scrape from the start page until the last page implied by the result
    /// count. Without a count the run stops after the page it is on.
    pub async fn scrape_all_pages(&mut self) -> Result<ScrapeSummary> {
        self.current_page = self.query.start_page.max(1);
        self.max_page = self.current_page;

        let mut pages_scraped = 0;
        let mut listings_written = 0;

        loop {
            if pages_scraped > 0 {
                self.pause_between_pages().await;
            }
            info!("Scraping data for page {}...", self.current_page);
            events::emit(
                &self.event_tx,
                ScrapeEvent::PageStarted {
                    page: self.current_page,
                    timestamp: events::now(),
                },
            );

            listings_written += self.scrape_page().await?;
            pages_scraped += 1;
            info!("Page {} scraped successfully.", self.current_page);

            // current_page < max_page below, so the increment cannot overflow.
            if self.current_page >= self.max_page {
                break;
            }
            self.current_page += 1;
        }

        events::emit(
            &self.event_tx,
            ScrapeEvent::Finished {
                path: self.file_path.clone(),
                records: listings_written,
                timestamp: events::now(),
            },
        );

        Ok(ScrapeSummary {
            path: self.file_path.clone(),
            pages_scraped,
            listings_written,
        })
    }
}
