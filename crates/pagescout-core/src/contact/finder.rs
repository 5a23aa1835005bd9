//! Contact finder — crawls the websites listed in a CSV for contact details.

use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::extract::{extract_contact_info, find_contact_page_links, normalize_website, resolve_url};
use super::verify::{verify_site_contacts, DnsMxLookup, MxLookup};
use crate::config::Config;
use crate::error::Result;
use crate::events::{self, ScrapeEvent, EVENT_CHANNEL_CAPACITY};
use crate::http::{build_client, fetch};
use crate::output::{default_emails_path, read_websites, write_site_contacts};
use crate::types::{FinderSummary, SiteContacts};

enum SiteOutcome {
    Found(SiteContacts),
    Unreachable(String),
    NoContacts(String),
}

async fn crawl_website(client: &Client, website: &str) -> SiteOutcome {
    let website = normalize_website(website);
    info!("Processing website: {}", website);

    let homepage = fetch(client, &website).await;
    if homepage.is_empty() {
        info!("Failed to fetch homepage for: {}", website);
        return SiteOutcome::Unreachable(website);
    }

    let mut info = extract_contact_info(&homepage, &website);
    let mut contact_pages = find_contact_page_links(&homepage, &website);
    if contact_pages.is_empty() {
        contact_pages.push(resolve_url(&website, "contact"));
    }

    for url in &contact_pages {
        info!("  Fetching contact page: {}", url);
        let page = fetch(client, url).await;
        if !page.is_empty() {
            info.merge(extract_contact_info(&page, url));
        }
    }

    if info.is_empty() {
        info!("No contact info found for: {}", website);
        return SiteOutcome::NoContacts(website);
    }
    SiteOutcome::Found(SiteContacts::from_info(website, info))
}

/// Homepage plus contact pages (or `/contact` when none are linked).
/// None when the homepage is unreachable or nothing was found.
pub async fn process_website(client: &Client, website: &str) -> Option<SiteContacts> {
    match crawl_website(client, website).await {
        SiteOutcome::Found(site) => Some(site),
        _ => None,
    }
}

pub struct ContactFinder {
    config: Config,
    client: Client,
    lookup: Arc<dyn MxLookup>,
    event_tx: broadcast::Sender<ScrapeEvent>,
}

impl ContactFinder {
    /// Finder backed by the system DNS resolver.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_lookup(config, Arc::new(DnsMxLookup::from_system_conf()))
    }

    pub fn with_lookup(config: Config, lookup: Arc<dyn MxLookup>) -> Result<Self> {
        let client = build_client(&config, config.fetch_timeout())?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config,
            client,
            lookup,
            event_tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScrapeEvent> {
        self.event_tx.subscribe()
    }

    /// Crawl every website in `input`'s `Website` column and write the sites
    /// with verified e-mails to `output` (default `<input>_emails.csv`).
    /// Nothing is written when no site survives.
    pub async fn find(&self, input: &Path, output: Option<&Path>) -> Result<FinderSummary> {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_emails_path(input));

        let websites = read_websites(input)?;
        info!("Read {} websites from {}", websites.len(), input.display());

        let client = self.client.clone();
        let mut outcomes = stream::iter(websites.clone())
            .map(move |site| {
                let client = client.clone();
                async move { crawl_website(&client, &site).await }
            })
            .buffer_unordered(self.config.max_concurrent_sites);

        let mut found = Vec::new();
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                SiteOutcome::Found(site) => {
                    info!("Finished processing: {}", site.website);
                    events::emit(
                        &self.event_tx,
                        ScrapeEvent::SiteProcessed {
                            website: site.website.clone(),
                            emails: site.emails.len(),
                            social_links: site.social_links.len(),
                            timestamp: events::now(),
                        },
                    );
                    found.push(site);
                }
                SiteOutcome::Unreachable(website) => self.skip(website, "homepage unreachable"),
                SiteOutcome::NoContacts(website) => self.skip(website, "no contact info found"),
            }
        }
        let sites_with_contacts = found.len();

        let verified = verify_site_contacts(self.lookup.as_ref(), found).await;

        let path = if verified.is_empty() {
            warn!("No websites with verified email contact info were found.");
            None
        } else {
            write_site_contacts(&output, &verified)?;
            events::emit(
                &self.event_tx,
                ScrapeEvent::Finished {
                    path: output.clone(),
                    records: verified.len(),
                    timestamp: events::now(),
                },
            );
            Some(output)
        };

        Ok(FinderSummary {
            path,
            websites_read: websites.len(),
            sites_with_contacts,
            sites_verified: verified.len(),
        })
    }

    fn skip(&self, website: String, reason: &str) {
        events::emit(
            &self.event_tx,
            ScrapeEvent::SiteSkipped {
                website,
                reason: reason.to_string(),
                timestamp: events::now(),
            },
        );
    }
}
