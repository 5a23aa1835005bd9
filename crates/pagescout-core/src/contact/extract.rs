//! Pulls e-mail addresses, social profiles and contact-page links out of HTML.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};

use crate::types::ContactInfo;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("static regex must compile"));

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector must parse"));

/// Hosts whose links count as social profiles.
pub const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
];

/// Resolve `href` against `base` the way a browser would.
/// An unparseable base leaves the href untouched.
pub fn resolve_url(base: &str, href: &str) -> String {
    match Url::parse(base).and_then(|b| b.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Prefix `http://` onto bare domains.
pub fn normalize_website(site: &str) -> String {
    let site = site.trim();
    if site.starts_with("http://") || site.starts_with("https://") {
        site.to_string()
    } else {
        format!("http://{site}")
    }
}

/// E-mails are matched over the raw markup, so addresses in scripts and
/// attributes count too.
pub fn extract_contact_info(html: &str, base_url: &str) -> ContactInfo {
    let emails: BTreeSet<String> = EMAIL_RE
        .find_iter(html)
        .map(|m| m.as_str().to_string())
        .collect();

    let doc = Html::parse_document(html);
    let social_links = doc
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| resolve_url(base_url, href))
        .filter(|url| SOCIAL_DOMAINS.iter().any(|d| url.contains(d)))
        .collect();

    ContactInfo {
        emails,
        social_links,
    }
}

/// Links whose text or target mentions "contact".
pub fn find_contact_page_links(html: &str, base_url: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut urls = BTreeSet::new();

    for a in doc.select(&ANCHORS) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let text = a.text().collect::<String>().trim().to_lowercase();
        if text.contains("contact") || href.to_lowercase().contains("contact") {
            urls.insert(resolve_url(base_url, href));
        }
    }

    urls.into_iter().collect()
}

/// Weed out matches that are not real addresses, e.g. `jquery@3.6.0` style
/// package strings, whose domain part has no letters.
pub fn is_clean_email(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if domain.contains("gmail") {
        return true;
    }
    domain.chars().any(char::is_alphabetic)
}
