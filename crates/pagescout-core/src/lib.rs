//! pagescout-core — business directory scraping and contact discovery, no UI.
//!
//! Two pipelines live here: the search scraper, which walks a directory's
//! result pages and appends every listing to a CSV file, and the contact
//! finder, which visits the websites in such a file and keeps the ones with a
//! verified e-mail address. Frontends subscribe to progress via
//! tokio::broadcast.

pub mod config;
pub mod contact;
pub mod error;
pub mod events;
pub mod http;
pub mod listing;
pub mod output;
pub mod search;
pub mod types;

pub use error::{Result, ScrapeError};
