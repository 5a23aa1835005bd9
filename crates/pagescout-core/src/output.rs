//! CSV sink — listing files, website input, contact output.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::types::{BusinessListing, SiteContacts};

/// Column the contact finder reads websites from.
pub const WEBSITE_COLUMN: &str = "Website";

/// Append listings to `path`. The header row is written only when the file
/// did not exist before this call.
pub fn append_listings(path: &Path, listings: &[BusinessListing]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file_exists = path.is_file();

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    for listing in listings {
        writer.serialize(listing)?;
    }
    writer.flush()?;

    debug!("Appended {} listings to {}", listings.len(), path.display());
    Ok(())
}

#[derive(Serialize)]
struct SiteContactsRow<'a> {
    website: &'a str,
    emails: String,
    social_links: String,
}

/// Write (overwriting) the contact finder's results.
pub fn write_site_contacts(path: &Path, sites: &[SiteContacts]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for site in sites {
        writer.serialize(SiteContactsRow {
            website: &site.website,
            emails: site.emails.join(", "),
            social_links: site.social_links.join(", "),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Non-blank values of the `Website` column, in file order.
pub fn read_websites(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)?;
    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == WEBSITE_COLUMN)
        .ok_or_else(|| ScrapeError::MissingColumn {
            column: WEBSITE_COLUMN.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut websites = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(site) = record.get(column).map(str::trim).filter(|s| !s.is_empty()) {
            websites.push(site.to_string());
        }
    }
    Ok(websites)
}

/// `dir/leads.csv` -> `dir/leads_emails.csv`.
pub fn default_emails_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("websites");
    input.with_file_name(format!("{stem}_emails.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LISTING_FIELDS;

    fn listing(name: &str, website: &str) -> BusinessListing {
        BusinessListing {
            rank: "1".into(),
            business_name: name.into(),
            website: website.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        append_listings(&path, &[listing("A", "http://a.example")]).unwrap();
        append_listings(&path, &[listing("B", "")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], LISTING_FIELDS.join(","));
        assert!(lines[1].starts_with("1,A,,,http://a.example"));
        assert_eq!(content.matches("Business Name").count(), 1);
    }

    #[test]
    fn test_read_websites_drops_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        append_listings(
            &path,
            &[
                listing("A", "http://a.example"),
                listing("B", ""),
                listing("C", "c.example"),
            ],
        )
        .unwrap();

        let sites = read_websites(&path).unwrap();
        assert_eq!(sites, vec!["http://a.example", "c.example"]);
    }

    #[test]
    fn test_read_websites_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "name,url\nx,http://x.example\n").unwrap();

        let err = read_websites(&path).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingColumn { .. }));
    }

    #[test]
    fn test_write_site_contacts_joins_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emails.csv");
        let sites = vec![SiteContacts {
            website: "http://a.example".into(),
            emails: vec!["a@a.example".into(), "b@a.example".into()],
            social_links: vec!["https://facebook.com/a".into()],
        }];

        write_site_contacts(&path, &sites).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "website,emails,social_links");
        assert_eq!(
            lines[1],
            "http://a.example,\"a@a.example, b@a.example\",https://facebook.com/a"
        );
    }

    #[test]
    fn test_default_emails_path() {
        assert_eq!(
            default_emails_path(Path::new("output/plumbersAustin TX.csv")),
            PathBuf::from("output/plumbersAustin TX_emails.csv")
        );
        assert_eq!(
            default_emails_path(Path::new("leads.csv")),
            PathBuf::from("leads_emails.csv")
        );
    }
}
