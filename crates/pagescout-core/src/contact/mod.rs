//! Contact discovery — extraction from HTML, e-mail verification, and the
//! finder that crawls business websites.

pub mod extract;
pub mod finder;
pub mod verify;

pub use extract::{extract_contact_info, find_contact_page_links, is_clean_email};
pub use finder::{process_website, ContactFinder};
pub use verify::{DnsMxLookup, MxLookup};
