use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use scraper::Html;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;

/// Whether the server certificate chain is checked. Some target sites ship broken chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tls {
    Verify,
    Insecure,
}

/// Anything that can hand out parsed pages. Unreachable pages are `None`, never an error.
pub trait PageSource {
    fn fetch(&self, url: &str, tls: Tls) -> Option<Html>;

    /// Courtesy delay between sequential requests.
    fn pause(&self) {}
}

#[derive(Debug, Error)]
enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Blocking HTTP fetcher: one attempt per page, bounded timeout.
pub struct HttpSource {
    strict: Client,
    insecure: Client,
    delay: Duration,
}

impl HttpSource {
    pub fn new(settings: &Settings) -> Result<Self> {
        let build = |accept_invalid: bool| -> Result<Client> {
            let mut headers = HeaderMap::new();
            headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
            Client::builder()
                .user_agent(settings.user_agent.as_str())
                .default_headers(headers)
                .timeout(Duration::from_secs(settings.timeout_secs))
                .danger_accept_invalid_certs(accept_invalid)
                .build()
                .context("Failed to create HTTP client")
        };

        Ok(HttpSource {
            strict: build(false)?,
            insecure: build(true)?,
            delay: Duration::from_millis(settings.request_delay_ms),
        })
    }

    fn get_text(&self, url: &str, tls: Tls) -> Result<String, FetchError> {
        let client = match tls {
            Tls::Verify => &self.strict,
            Tls::Insecure => &self.insecure,
        };
        let response = client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.text()?)
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str, tls: Tls) -> Option<Html> {
        match self.get_text(url, tls) {
            Ok(body) => {
                debug!(url, bytes = body.len(), "fetched");
                Some(Html::parse_document(&body))
            }
            Err(e) => {
                warn!("Could not fetch {}: {}", url, e);
                None
            }
        }
    }

    fn pause(&self) {
        std::thread::sleep(self.delay);
    }
}

/// In-memory pages keyed by URL. Unmapped URLs behave like unreachable hosts.
#[cfg(test)]
#[derive(Default)]
pub struct FixtureSource {
    pages: std::collections::HashMap<String, String>,
    requests: std::cell::RefCell<Vec<(String, Tls)>>,
}

#[cfg(test)]
impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn with_fixture(self, url: &str, fixture: &str) -> Self {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap();
        self.with_page(url, html)
    }

    pub fn requests(&self) -> Vec<(String, Tls)> {
        self.requests.borrow().clone()
    }
}

#[cfg(test)]
impl PageSource for FixtureSource {
    fn fetch(&self, url: &str, tls: Tls) -> Option<Html> {
        self.requests.borrow_mut().push((url.to_string(), tls));
        self.pages.get(url).map(|html| Html::parse_document(html))
    }
}
