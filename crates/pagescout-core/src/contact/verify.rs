//! E-mail verification by MX record presence.

use async_trait::async_trait;
use futures::future::join_all;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, info, warn};

use super::extract::is_clean_email;
use crate::types::SiteContacts;

/// Answers whether a mail domain has MX records.
#[async_trait]
pub trait MxLookup: Send + Sync {
    async fn has_mx_record(&self, domain: &str) -> bool;
}

/// System DNS resolver.
pub struct DnsMxLookup {
    resolver: TokioAsyncResolver,
}

impl DnsMxLookup {
    /// Uses /etc/resolv.conf (or the platform equivalent); falls back to
    /// the resolver's built-in upstreams when that cannot be read.
    pub fn from_system_conf() -> Self {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(r) => r,
            Err(e) => {
                warn!("System DNS config unavailable ({}), using defaults", e);
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self { resolver }
    }
}

#[async_trait]
impl MxLookup for DnsMxLookup {
    async fn has_mx_record(&self, domain: &str) -> bool {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => lookup.iter().next().is_some(),
            Err(e) => {
                debug!("DNS lookup failed for domain {}: {}", domain, e);
                false
            }
        }
    }
}

/// The domain is whatever follows the last '@'.
pub async fn verify_email<L: MxLookup + ?Sized>(lookup: &L, email: &str) -> bool {
    let domain = email.rsplit('@').next().unwrap_or_default();
    if domain.is_empty() {
        return false;
    }
    lookup.has_mx_record(domain).await
}

/// Keep only sites left with at least one clean, verified e-mail.
/// Site order is preserved.
pub async fn verify_site_contacts<L: MxLookup + ?Sized>(
    lookup: &L,
    sites: Vec<SiteContacts>,
) -> Vec<SiteContacts> {
    let mut verified = Vec::new();

    for mut site in sites {
        if site.emails.is_empty() {
            continue;
        }

        let cleaned: Vec<String> = site
            .emails
            .iter()
            .filter(|e| is_clean_email(e))
            .cloned()
            .collect();
        if cleaned.is_empty() {
            info!("No clean emails found for website: {}", site.website);
            continue;
        }

        let outcomes = join_all(cleaned.iter().map(|e| verify_email(lookup, e))).await;
        let emails: Vec<String> = cleaned
            .into_iter()
            .zip(outcomes)
            .filter_map(|(email, ok)| ok.then_some(email))
            .collect();

        if emails.is_empty() {
            info!("All emails failed verification for website: {}", site.website);
            continue;
        }
        site.emails = emails;
        verified.push(site);
    }

    verified
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Resolver stand-in that knows a fixed set of mail domains.
    pub(crate) struct FakeMx(pub HashSet<&'static str>);

    #[async_trait]
    impl MxLookup for FakeMx {
        async fn has_mx_record(&self, domain: &str) -> bool {
            self.0.contains(domain)
        }
    }

    fn site(website: &str, emails: &[&str]) -> SiteContacts {
        SiteContacts {
            website: website.into(),
            emails: emails.iter().map(|e| e.to_string()).collect(),
            social_links: vec![],
        }
    }

    #[tokio::test]
    async fn test_verify_email_uses_domain() {
        let mx = FakeMx(HashSet::from(["good.example"]));
        assert!(verify_email(&mx, "a@good.example").await);
        assert!(!verify_email(&mx, "a@bad.example").await);
        assert!(!verify_email(&mx, "trailing@").await);
    }

    #[tokio::test]
    async fn test_verify_site_contacts_filters() {
        let mx = FakeMx(HashSet::from(["good.example"]));
        let sites = vec![
            site("http://one", &["a@good.example", "b@bad.example", "lib@1.2.3"]),
            site("http://two", &[]),
            site("http://three", &["x@1.0"]),
            site("http://four", &["y@bad.example"]),
            site("http://five", &["z@good.example"]),
        ];

        let verified = verify_site_contacts(&mx, sites).await;
        assert_eq!(verified.len(), 2);
        assert_eq!(verified[0].website, "http://one");
        assert_eq!(verified[0].emails, vec!["a@good.example"]);
        assert_eq!(verified[1].website, "http://five");
    }
}
