//! Core types — listings, contact info, search queries, run summaries.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ── Directory listings ──

/// One business card from a search result page. Every field is empty when
/// the card does not carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessListing {
    #[serde(rename = "Rank")]
    pub rank: String,
    #[serde(rename = "Business Name")]
    pub business_name: String,
    #[serde(rename = "Phone Number")]
    pub phone_number: String,
    #[serde(rename = "Business Page")]
    pub business_page: String,
    #[serde(rename = "Website")]
    pub website: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Street Name")]
    pub street_name: String,
    #[serde(rename = "Locality")]
    pub locality: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Zipcode")]
    pub zipcode: String,
}

/// CSV header row for listing files, in column order.
pub const LISTING_FIELDS: &[&str] = &[
    "Rank",
    "Business Name",
    "Phone Number",
    "Business Page",
    "Website",
    "Category",
    "Rating",
    "Street Name",
    "Locality",
    "Region",
    "Zipcode",
];

/// What to search for and where to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub search_terms: String,
    pub geo_location_terms: String,
    #[serde(default = "default_start_page")]
    pub start_page: u32,
}

fn default_start_page() -> u32 {
    1
}

impl SearchQuery {
    pub fn new(search_terms: impl Into<String>, geo_location_terms: impl Into<String>) -> Self {
        Self {
            search_terms: search_terms.into(),
            geo_location_terms: geo_location_terms.into(),
            start_page: default_start_page(),
        }
    }

    pub fn with_start_page(mut self, start_page: u32) -> Self {
        self.start_page = start_page.max(1);
        self
    }
}

// ── Contact discovery ──

/// Contact details pulled from a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    pub emails: BTreeSet<String>,
    pub social_links: BTreeSet<String>,
}

impl ContactInfo {
    pub fn merge(&mut self, other: ContactInfo) {
        self.emails.extend(other.emails);
        self.social_links.extend(other.social_links);
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.social_links.is_empty()
    }
}

/// Everything found for one website across its homepage and contact pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContacts {
    pub website: String,
    pub emails: Vec<String>,
    pub social_links: Vec<String>,
}

impl SiteContacts {
    pub fn from_info(website: impl Into<String>, info: ContactInfo) -> Self {
        Self {
            website: website.into(),
            emails: info.emails.into_iter().collect(),
            social_links: info.social_links.into_iter().collect(),
        }
    }
}

// ── Run summaries ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeSummary {
    pub path: PathBuf,
    pub pages_scraped: u32,
    pub listings_written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderSummary {
    /// None when no site survived verification and nothing was written.
    pub path: Option<PathBuf>,
    pub websites_read: usize,
    pub sites_with_contacts: usize,
    pub sites_verified: usize,
}
