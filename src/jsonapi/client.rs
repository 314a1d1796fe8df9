use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::blocking::Client;

use super::document::Document;
use super::walker::PageSource;
use super::WalkError;

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(20))
        .user_agent("kieznotiz/0.1 (+https://github.com/oklab-leipzig/kieznotiz)")
        .build()
        .expect("http client")
});

/// Fetches one collection endpoint page by page via offset pagination.
pub struct HttpSource {
    url: String,
    page_size: usize,
}

impl HttpSource {
    pub fn new(url: String, page_size: usize) -> Self {
        Self { url, page_size }
    }
}

impl PageSource for HttpSource {
    fn fetch_page(&self, offset: usize) -> Result<Document, WalkError> {
        let response = CLIENT
            .get(&self.url)
            .query(&[
                ("page[offset]", offset.to_string()),
                ("page[limit]", self.page_size.to_string()),
            ])
            .send()
            .map_err(|err| WalkError::Transport(format!("request failed for {}: {err}", self.url)))?;
        let response = response.error_for_status().map_err(|err| {
            WalkError::Transport(format!("non-success status for {}: {err}", self.url))
        })?;
        response.json().map_err(|err| {
            WalkError::Document(format!("unable to decode page from {}: {err}", self.url))
        })
    }
}
