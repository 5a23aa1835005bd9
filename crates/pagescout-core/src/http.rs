//! HTTP plumbing shared by the search scraper and the contact finder.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, ScrapeError};

/// Build the shared client. Redirects are followed (reqwest default, up to 10).
pub fn build_client(config: &Config, timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Fetch a search result page. Anything but a 2xx is an error.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    debug!("GET {}", url);
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(resp.text().await?)
}

/// Fetch a business page for contact extraction. Failures are logged and
/// come back as an empty body, so one dead site never stops a run.
pub async fn fetch(client: &Client, url: &str) -> String {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        warn!("Refusing to fetch non-http URL: {}", url);
        return String::new();
    }

    match client.get(url).send().await {
        Ok(resp) if resp.status() == StatusCode::OK => match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Error reading body of {}: {}", url, e);
                String::new()
            }
        },
        Ok(resp) => {
            warn!("Non-200 status code {} for URL: {}", resp.status().as_u16(), url);
            String::new()
        }
        Err(e) => {
            warn!("Error fetching {}: {}", url, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        build_client(&Config::default(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
            .mount(&server)
            .await;

        let body = fetch(&client(), &server.uri()).await;
        assert_eq!(body, "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_fetch_swallows_non_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let body = fetch(&client(), &format!("{}/gone", server.uri())).await;
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejects_other_schemes() {
        assert!(fetch(&client(), "ftp://example.com").await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_page_errors_on_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetch_page(&client(), &server.uri()).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 503, .. }));
    }
}
