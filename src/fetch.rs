use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use tracing::{debug, warn};

use crate::config::Config;
use crate::constants::NOT_LOADED_MARKER;
use crate::error::FetchError;
use crate::models::RawDocument;

/// Fetches one page and returns its visible content as markdown/plain text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str) -> Result<RawDocument, FetchError>;
}

/// Timeout and the narrow "page still rendering" retry applied to every fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub not_loaded_retries: u32,
    pub not_loaded_delay: Duration,
}

impl FetchPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.fetch_timeout,
            not_loaded_retries: config.not_loaded_retries,
            not_loaded_delay: config.not_loaded_delay,
        }
    }
}

pub fn is_not_loaded(body: &str) -> bool {
    body.to_lowercase().contains(NOT_LOADED_MARKER)
}

/// Fetches `url` and degrades every failure to an empty document.
///
/// Only the reader's "not yet fully loaded" signal is retried; errors,
/// non-success statuses and timeouts give up on the source immediately.
pub async fn fetch_document(
    fetcher: &dyn PageFetcher,
    url: &str,
    policy: &FetchPolicy,
) -> RawDocument {
    let mut attempt = 0;
    loop {
        match tokio::time::timeout(policy.timeout, fetcher.fetch(url)).await {
            Ok(Ok(mut doc)) => {
                if is_not_loaded(&doc.text) && attempt < policy.not_loaded_retries {
                    attempt += 1;
                    debug!(
                        "{} reports {} not fully loaded, retry {}/{}",
                        fetcher.name(),
                        url,
                        attempt,
                        policy.not_loaded_retries
                    );
                    tokio::time::sleep(policy.not_loaded_delay).await;
                    continue;
                }
                debug!("{} fetched {} ({} bytes)", fetcher.name(), url, doc.text.len());
                doc.text = doc.text.replace('\u{00A0}', " ").replace('\r', "");
                return doc;
            }
            Ok(Err(e)) => {
                warn!("{} failed for {}: {}", fetcher.name(), url, e);
                return RawDocument::default();
            }
            Err(_) => {
                warn!("{} timed out after {:?} for {}", fetcher.name(), policy.timeout, url);
                return RawDocument::default();
            }
        }
    }
}

/// Text-rendering proxy: `GET {base}{url}` returns the page as markdown.
pub struct ReaderProxy {
    client: Client,
    base: String,
    api_key: Option<String>,
}

impl ReaderProxy {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.fetch_timeout).build()?;
        Ok(Self {
            client,
            base: config.reader_base.clone(),
            api_key: config.reader_api_key.clone(),
        })
    }

    pub fn proxy_url(&self, url: &str) -> String {
        format!("{}{}", self.base, url)
    }
}

#[async_trait]
impl PageFetcher for ReaderProxy {
    fn name(&self) -> &'static str {
        "reader"
    }

    async fn fetch(&self, url: &str) -> Result<RawDocument, FetchError> {
        let mut request = self
            .client
            .get(self.proxy_url(url))
            .header(ACCEPT, "text/plain");
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<Vec<Result<String, FetchError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(mut replies: Vec<Result<String, FetchError>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PageFetcher for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch(&self, _url: &str) -> Result<RawDocument, FetchError> {
            *self.calls.lock().unwrap() += 1;
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(FetchError::Empty))
                .map(RawDocument::from)
        }
    }

    struct Hanging;

    #[async_trait]
    impl PageFetcher for Hanging {
        fn name(&self) -> &'static str {
            "hanging"
        }

        async fn fetch(&self, _url: &str) -> Result<RawDocument, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("never".into())
        }
    }

    fn policy() -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_millis(50),
            not_loaded_retries: 2,
            not_loaded_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn retries_only_the_not_loaded_signal() {
        let fetcher = Scripted::new(vec![
            Ok("Warning: This page maybe not yet fully loaded".into()),
            Ok("Real\u{00A0}body\r\n".into()),
        ]);
        assert_eq!(fetch_document(&fetcher, "https://x", &policy()).await.text, "Real body\n");
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn not_loaded_retries_are_bounded() {
        let stuck = "not yet fully loaded".to_string();
        let fetcher = Scripted::new(vec![Ok(stuck.clone()), Ok(stuck.clone()), Ok(stuck.clone()), Ok(stuck)]);
        let doc = fetch_document(&fetcher, "https://x", &policy()).await;
        assert!(is_not_loaded(&doc.text));
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn errors_degrade_to_empty_without_retry() {
        let fetcher = Scripted::new(vec![Err(FetchError::Status(503)), Ok("late".into())]);
        assert!(fetch_document(&fetcher, "https://x", &policy()).await.is_empty());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn timeout_degrades_to_empty() {
        assert!(fetch_document(&Hanging, "https://x", &policy()).await.is_empty());
    }

    #[test]
    fn proxy_url_prefixes_target() {
        let proxy = ReaderProxy::new(&Config::default()).unwrap();
        assert_eq!(
            proxy.proxy_url("https://sieportal.siemens.com/en-ww/product/X"),
            "https://r.jina.ai/https://sieportal.siemens.com/en-ww/product/X"
        );
    }
}
