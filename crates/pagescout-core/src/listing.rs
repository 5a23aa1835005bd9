//! Search result page parsing — listing cards, result counts, pagination.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::types::BusinessListing;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static CARDS: LazyLock<Selector> = LazyLock::new(|| selector(".organic .srp-listing"));
static SHOWING_COUNT: LazyLock<Selector> = LazyLock::new(|| selector(".showing-count"));
static RANK: LazyLock<Selector> = LazyLock::new(|| selector(".info-primary h2"));
static NAME: LazyLock<Selector> = LazyLock::new(|| selector(".business-name span"));
static PHONE: LazyLock<Selector> = LazyLock::new(|| selector(".phones"));
static BUSINESS_LINK: LazyLock<Selector> = LazyLock::new(|| selector(".business-name"));
static WEBSITE: LazyLock<Selector> = LazyLock::new(|| selector(".track-visit-website"));
static CATEGORIES: LazyLock<Selector> = LazyLock::new(|| selector(".categories a"));
static RATING: LazyLock<Selector> = LazyLock::new(|| selector(".ratings .count"));
static STREET: LazyLock<Selector> = LazyLock::new(|| selector(".street-address"));
static LOCALITY: LazyLock<Selector> = LazyLock::new(|| selector(".locality"));

/// A parsed result page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsPage {
    pub listings: Vec<BusinessListing>,
    /// Total results across all pages, when the page states it.
    pub result_count: Option<u32>,
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn first_text(card: ElementRef<'_>, sel: &Selector) -> String {
    card.select(sel).next().map(text_of).unwrap_or_default()
}

fn first_attr(card: ElementRef<'_>, sel: &Selector, attr: &str) -> Option<String> {
    card.select(sel)
        .next()
        .map(|el| el.value().attr(attr).unwrap_or_default().to_string())
}

/// Extract one listing card. `base_url` prefixes the relative business page link.
pub fn parse_listing(card: ElementRef<'_>, base_url: &str) -> BusinessListing {
    let rank = first_text(card, &RANK)
        .split(". ")
        .next()
        .unwrap_or_default()
        .to_string();

    let business_page = first_attr(card, &BUSINESS_LINK, "href")
        .map(|href| format!("{base_url}{href}"))
        .unwrap_or_default();

    let category = card
        .select(&CATEGORIES)
        .map(text_of)
        .collect::<Vec<_>>()
        .join(", ");

    let rating = first_text(card, &RATING)
        .trim_matches(|c| c == '(' || c == ')')
        .to_string();

    let (locality, region, zipcode) = split_locality(&first_text(card, &LOCALITY));

    BusinessListing {
        rank,
        business_name: first_text(card, &NAME),
        phone_number: first_text(card, &PHONE),
        business_page,
        website: first_attr(card, &WEBSITE, "href").unwrap_or_default(),
        category,
        rating,
        street_name: first_text(card, &STREET),
        locality,
        region,
        zipcode,
    }
}

/// Split "Springfield, IL 62701" into ("Springfield", "IL", "62701").
/// Text without a comma is all locality.
pub fn split_locality(text: &str) -> (String, String, String) {
    let text = text.trim();
    if text.is_empty() {
        return Default::default();
    }

    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() < 2 {
        return (text.to_string(), String::new(), String::new());
    }

    let locality = parts[0].trim().to_string();
    let mut region_zip = parts[1].split_whitespace();
    let region = region_zip.next().unwrap_or_default().to_string();
    let zipcode = region_zip.next().unwrap_or_default().to_string();
    (locality, region, zipcode)
}

/// Total result count from text like "Showing 1-30 of 120 More info".
pub fn parse_result_count(text: &str) -> Option<u32> {
    let cleaned = text.trim().replace("More info", "");
    let last = cleaned.split_whitespace().last()?;
    match last.parse::<u32>() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("Error parsing result count from '{}': {}", text.trim(), e);
            None
        }
    }
}

/// Parse a whole result page.
pub fn parse_results_page(html: &str, base_url: &str) -> ResultsPage {
    let doc = Html::parse_document(html);

    let result_count = doc
        .select(&SHOWING_COUNT)
        .next()
        .and_then(|el| parse_result_count(&el.text().collect::<String>()));

    let listings = doc
        .select(&CARDS)
        .map(|card| parse_listing(card, base_url))
        .collect();

    ResultsPage {
        listings,
        result_count,
    }
}

/// Last page to visit. Without a known non-zero count the current page is the last.
pub fn max_page(result_count: Option<u32>, current_page: u32, per_page: u32) -> u32 {
    match result_count {
        Some(count) if count > 0 => count.div_ceil(per_page.max(1)),
        _ => current_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.yellowpages.com";

    const PAGE: &str = r#"
<html><body>
  <div class="pagination"><span class="showing-count">Showing 1-30 of 95 More info</span></div>
  <div class="search-results organic">
    <div class="result srp-listing">
      <div class="info-primary">
        <h2 class="n">1. <a class="business-name" href="/springfield-il/mip/joes-pizza-123"><span>Joe's Pizza</span></a></h2>
        <div class="ratings"><span class="count">(17)</span></div>
      </div>
      <div class="categories"><a href="/c/pizza">Pizza</a><a href="/c/italian">Italian Restaurants</a></div>
      <div class="phones phone primary">(217) 555-0100</div>
      <div class="street-address">100 Main St</div>
      <div class="locality">Springfield, IL 62701</div>
      <a class="track-visit-website" href="http://joespizza.example">Website</a>
    </div>
    <div class="result srp-listing">
      <div class="info-primary">
        <h2 class="n">2. <a class="business-name" href="/x/mip/bare-1"><span>Bare Shop</span></a></h2>
      </div>
      <div class="locality">Shelbyville</div>
    </div>
  </div>
</body></html>"#;

    #[test]
    fn test_parse_full_card() {
        let page = parse_results_page(PAGE, BASE);
        assert_eq!(page.listings.len(), 2);

        let joe = &page.listings[0];
        assert_eq!(joe.rank, "1");
        assert_eq!(joe.business_name, "Joe's Pizza");
        assert_eq!(joe.phone_number, "(217) 555-0100");
        assert_eq!(
            joe.business_page,
            "https://www.yellowpages.com/springfield-il/mip/joes-pizza-123"
        );
        assert_eq!(joe.website, "http://joespizza.example");
        assert_eq!(joe.category, "Pizza, Italian Restaurants");
        assert_eq!(joe.rating, "17");
        assert_eq!(joe.street_name, "100 Main St");
        assert_eq!(joe.locality, "Springfield");
        assert_eq!(joe.region, "IL");
        assert_eq!(joe.zipcode, "62701");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let page = parse_results_page(PAGE, BASE);
        let bare = &page.listings[1];
        assert_eq!(bare.rank, "2");
        assert_eq!(bare.website, "");
        assert_eq!(bare.phone_number, "");
        assert_eq!(bare.category, "");
        assert_eq!(bare.rating, "");
        assert_eq!(bare.locality, "Shelbyville");
        assert_eq!(bare.region, "");
    }

    #[test]
    fn test_result_count_from_page() {
        let page = parse_results_page(PAGE, BASE);
        assert_eq!(page.result_count, Some(95));
    }

    #[test]
    fn test_page_without_cards() {
        let page = parse_results_page("<html><body><p>nothing</p></body></html>", BASE);
        assert!(page.listings.is_empty());
        assert_eq!(page.result_count, None);
    }

    #[test]
    fn test_split_locality_variants() {
        assert_eq!(
            split_locality("Austin, TX 78701"),
            ("Austin".into(), "TX".into(), "78701".into())
        );
        assert_eq!(
            split_locality("Austin, TX"),
            ("Austin".into(), "TX".into(), String::new())
        );
        assert_eq!(
            split_locality("Austin"),
            ("Austin".into(), String::new(), String::new())
        );
        assert_eq!(split_locality("  "), Default::default());
    }

    #[test]
    fn test_parse_result_count() {
        assert_eq!(parse_result_count("Showing 1-30 of 120"), Some(120));
        assert_eq!(parse_result_count("Showing 1-30 of 120More info"), Some(120));
        assert_eq!(parse_result_count("no count here"), None);
        assert_eq!(parse_result_count(""), None);
    }

    #[test]
    fn test_max_page() {
        assert_eq!(max_page(Some(120), 1, 30), 4);
        assert_eq!(max_page(Some(95), 1, 30), 4);
        assert_eq!(max_page(Some(30), 1, 30), 1);
        assert_eq!(max_page(Some(0), 3, 30), 3);
        assert_eq!(max_page(None, 5, 30), 5);
    }
}
