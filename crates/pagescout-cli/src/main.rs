//! pagescout — scrape directory listings and find contact e-mails for them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use pagescout_core::config::Config;
use pagescout_core::contact::ContactFinder;
use pagescout_core::events::ScrapeEvent;
use pagescout_core::search::YellowPageScraper;
use pagescout_core::types::SearchQuery;

/// Business directory scraper
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML config file (defaults apply when it does not exist)
    #[arg(long, global = true, default_value = "pagescout.yaml", env = "PAGESCOUT_CONFIG")]
    config: PathBuf,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print progress events as JSON lines instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape every result page for a search and save the listings as CSV
    Search {
        /// Search terms, e.g. "plumbers"
        search_terms: String,

        /// Location terms, e.g. "Austin, TX"
        geo_location_terms: String,

        /// Result page to start on
        #[arg(long, default_value_t = 1)]
        start_page: u32,

        /// Afterwards, find e-mails for the scraped websites
        #[arg(long)]
        emails: bool,

        /// Where to write the e-mail CSV (default: <listings>_emails.csv)
        #[arg(long, requires = "emails")]
        emails_output: Option<PathBuf>,
    },

    /// Find contact e-mails for the websites in a CSV's "Website" column
    FindEmails {
        /// CSV with a "Website" column
        input: PathBuf,

        /// Where to write results (default: <input>_emails.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Print events to stderr until the sender is dropped.
fn spawn_progress_printer(
    mut rx: broadcast::Receiver<ScrapeEvent>,
    json: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if json {
                        eprintln!("{}", event.to_json());
                    } else {
                        eprintln!("{}", event.describe());
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Progress printer lagged by {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn find_emails(
    config: Config,
    input: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let finder = ContactFinder::new(config).context("Failed to set up contact finder")?;
    let printer = spawn_progress_printer(finder.subscribe(), json);

    let summary = finder
        .find(input, output)
        .await
        .with_context(|| format!("Finding emails for {} failed", input.display()))?;
    drop(finder);
    let _ = printer.await;

    info!(
        "{} websites read, {} with contact info, {} verified",
        summary.websites_read, summary.sites_with_contacts, summary.sites_verified
    );
    match summary.path {
        Some(path) => println!("{}", path.display()),
        None => eprintln!("No websites with verified email contact info were found."),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Command::Search {
            search_terms,
            geo_location_terms,
            start_page,
            emails,
            emails_output,
        } => {
            let query =
                SearchQuery::new(search_terms, geo_location_terms).with_start_page(start_page);
            let mut scraper = YellowPageScraper::new(config.clone(), query)
                .context("Failed to set up scraper")?;
            let printer = spawn_progress_printer(scraper.subscribe(), cli.json);

            let summary = scraper.scrape_all_pages().await.context("Scrape failed")?;
            drop(scraper);
            let _ = printer.await;

            info!(
                "Scraped {} pages, {} listings",
                summary.pages_scraped, summary.listings_written
            );
            println!("{}", summary.path.display());

            if emails {
                if summary.path.is_file() {
                    find_emails(config, &summary.path, emails_output.as_deref(), cli.json).await?;
                } else {
                    eprintln!("No listings were saved, skipping email search.");
                }
            }
        }
        Command::FindEmails { input, output } => {
            find_emails(config, &input, output.as_deref(), cli.json).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_args() {
        let cli = Cli::parse_from([
            "pagescout",
            "search",
            "plumbers",
            "Austin, TX",
            "--start-page",
            "2",
            "--emails",
        ]);
        match cli.command {
            Command::Search {
                search_terms,
                geo_location_terms,
                start_page,
                emails,
                emails_output,
            } => {
                assert_eq!(search_terms, "plumbers");
                assert_eq!(geo_location_terms, "Austin, TX");
                assert_eq!(start_page, 2);
                assert!(emails);
                assert!(emails_output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_emails_output_requires_emails() {
        let result = Cli::try_parse_from([
            "pagescout",
            "search",
            "a",
            "b",
            "--emails-output",
            "x.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_find_emails() {
        let cli = Cli::parse_from(["pagescout", "--verbose", "find-emails", "leads.csv"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::FindEmails { ref input, output: None } if input == Path::new("leads.csv")
        ));
    }
}
