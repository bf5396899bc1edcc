use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants::{load_js_script, load_structured_description_script};
use crate::error::FetchError;
use crate::extractor::normalize::mentions_code;
use crate::fetch::PageFetcher;
use crate::models::RawDocument;

const BROWSER_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-background-timer-throttling",
    "--disable-renderer-backgrounding",
    "--disable-backgrounding-occluded-windows",
    "--disable-blink-features=AutomationControlled",
];

// Content areas on portal and catalog product pages
const READY_INDICATORS: &[&str] = &[
    "document.querySelector('main')",
    "document.querySelector('[class*=\"product\"]')",
    "document.querySelector('#content, .content, article')",
];

const READY_WAIT_MS: u64 = 10_000;
const READY_POLL_MS: u64 = 250;

/// Headless Chromium backend. The browser process is launched on first use
/// and shared; every fetch opens and closes its own tab.
#[derive(Clone)]
pub struct BrowserManager {
    instance: Arc<Mutex<Option<Arc<Browser>>>>,
    navigation_timeout: Duration,
}

/// Closes a tab when dropped, so a fetch cancelled by its timeout does not
/// leave the tab open in the shared browser.
pub struct TabGuard {
    close: Option<Pin<Box<dyn Future<Output = ()> + Send>>>,
}

impl TabGuard {
    pub fn new(close: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            close: Some(Box::pin(close)),
        }
    }

    pub async fn close(mut self) {
        if let Some(close) = self.close.take() {
            close.await;
        }
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        let Some(close) = self.close.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(close);
            }
            Err(_) => warn!("no runtime to close an abandoned tab"),
        }
    }
}

impl BrowserManager {
    pub fn new(config: &Config) -> Self {
        Self {
            instance: Arc::new(Mutex::new(None)),
            navigation_timeout: config.fetch_timeout,
        }
    }

    // Get the running browser or launch one
    async fn get_browser(&self) -> Result<Arc<Browser>, FetchError> {
        let mut lock = self.instance.lock().await;
        if let Some(ref browser) = *lock {
            return Ok(browser.clone());
        }

        let config = BrowserConfig::builder()
            .no_sandbox()
            .args(BROWSER_ARGS.iter().copied())
            .request_timeout(self.navigation_timeout)
            .build()
            .map_err(FetchError::Browser)?;
        let (browser, mut handler) = Browser::launch(config).await?;
        tokio::spawn(async move { while handler.next().await.is_some() {} });
        info!("headless browser launched");

        let browser = Arc::new(browser);
        *lock = Some(browser.clone());
        Ok(browser)
    }

    async fn forget_browser(&self) {
        self.instance.lock().await.take();
    }

    pub async fn scrape_page(&self, url: &str) -> Result<RawDocument, FetchError> {
        let browser = self.get_browser().await?;

        // Open blank first so the tab is guarded before navigation starts
        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // A dead browser process stays cached otherwise
                self.forget_browser().await;
                return Err(e.into());
            }
        };
        let tab = {
            let page = page.clone();
            let url = url.to_string();
            TabGuard::new(async move {
                if let Err(e) = page.close().await {
                    debug!("closing tab for {} failed: {}", url, e);
                }
            })
        };

        let rendered = render(&page, url).await;
        tab.close().await;
        let (structured, markdown) = rendered?;

        debug!(
            "rendered {}: {} chars markdown, structured description {}",
            url,
            markdown.len(),
            if structured.is_some() { "present" } else { "absent" }
        );
        Ok(RawDocument {
            text: markdown,
            structured: structured.and_then(|found| trusted_structured(url, found)),
        })
    }
}

async fn wait_until_ready(page: &Page) -> bool {
    for _ in 0..(READY_WAIT_MS / READY_POLL_MS) {
        for indicator in READY_INDICATORS {
            let ready = page
                .evaluate(format!(
                    "!!({indicator}) && ({indicator}).textContent.trim().length > 100"
                ))
                .await
                .ok()
                .and_then(|r| r.into_value::<bool>().ok())
                .unwrap_or(false);
            if ready {
                // Let late widgets settle
                tokio::time::sleep(Duration::from_millis(300)).await;
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(READY_POLL_MS)).await;
    }
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructuredKind {
    /// JSON-LD `Product.description`.
    Product,
    /// `og:description` or `meta[name=description]`.
    Meta,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StructuredDescription {
    pub kind: StructuredKind,
    pub text: String,
}

/// Navigates and returns the embedded structured description, if any, and
/// the page as markdown.
async fn render(
    page: &Page,
    url: &str,
) -> Result<(Option<StructuredDescription>, String), FetchError> {
    page.goto(url).await?;
    if !wait_until_ready(page).await {
        warn!("page did not become ready, using what is rendered");
    }

    let raw: String = page
        .evaluate(load_structured_description_script())
        .await?
        .into_value()
        .unwrap_or_default();
    let structured = serde_json::from_str::<StructuredDescription>(&raw).ok();

    let html: String = page
        .evaluate(load_js_script())
        .await?
        .into_value()
        .map_err(|e| FetchError::Browser(e.to_string()))?;

    Ok((structured, html2md::parse_html(&html)))
}

/// Part number a product page is about: `?mlfb=` or the last path segment.
/// Search pages have none.
fn code_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    if parsed.path().contains("/search") {
        return None;
    }
    if let Some((_, v)) = parsed
        .query_pairs()
        .find(|(k, _)| k.eq_ignore_ascii_case("mlfb"))
    {
        return Some(v.into_owned());
    }
    parsed
        .path_segments()?
        .rfind(|s| !s.is_empty())
        .map(|s| urlencoding::decode(s).map(|c| c.into_owned()).unwrap_or_else(|_| s.to_string()))
}

/// Structured text worth scoring for `url`. Only product pages qualify; a
/// meta description must also name the part, since sites reuse one generic
/// meta text across pages.
pub fn trusted_structured(url: &str, found: StructuredDescription) -> Option<String> {
    let code = code_from_url(url)?;
    let text = found.text.trim();
    if text.is_empty() {
        return None;
    }
    match found.kind {
        StructuredKind::Product => Some(text.to_string()),
        StructuredKind::Meta if mentions_code(text, &code) => Some(text.to_string()),
        StructuredKind::Meta => {
            debug!("ignoring meta description of {} that does not name {}", url, code);
            None
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserManager {
    fn name(&self) -> &'static str {
        "headless"
    }

    async fn fetch(&self, url: &str) -> Result<RawDocument, FetchError> {
        let doc = self.scrape_page(url).await?;
        if doc.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchPolicy, fetch_document};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::oneshot;

    const PRODUCT_URL: &str = "https://sieportal.siemens.com/en-ww/product/6ES7131-6BF01-0BA0";

    fn found(kind: StructuredKind, text: &str) -> StructuredDescription {
        StructuredDescription {
            kind,
            text: text.to_string(),
        }
    }

    #[test]
    fn code_is_read_from_mlfb_query_or_path() {
        assert_eq!(
            code_from_url("https://mall.industry.siemens.com/mall/en/ww/Catalog/Product/?mlfb=3VA2110-5HL32-0AA0")
                .as_deref(),
            Some("3VA2110-5HL32-0AA0")
        );
        assert_eq!(code_from_url(PRODUCT_URL).as_deref(), Some("6ES7131-6BF01-0BA0"));
        assert_eq!(code_from_url("https://sieportal.siemens.com/en-ww/search?q=6ES7131"), None);
        assert_eq!(code_from_url("not a url"), None);
    }

    #[test]
    fn structured_json_is_parsed() {
        let parsed: StructuredDescription =
            serde_json::from_str(r#"{"kind":"product","text":"Digital input module"}"#).unwrap();
        assert_eq!(parsed, found(StructuredKind::Product, "Digital input module"));
    }

    #[test]
    fn product_description_is_trusted_on_product_pages() {
        let text = "SIMATIC ET 200SP, digital input module, DI 8x 24V DC Standard";
        assert_eq!(
            trusted_structured(PRODUCT_URL, found(StructuredKind::Product, text)).as_deref(),
            Some(text)
        );
    }

    #[test]
    fn generic_meta_description_is_ignored() {
        let meta = "Discover our complete portfolio for industry: find the right product, configure it and order it directly on the Siemens platform.";
        assert_eq!(trusted_structured(PRODUCT_URL, found(StructuredKind::Meta, meta)), None);

        let naming = "6ES7131-6BF01-0BA0 - SIMATIC ET 200SP, digital input module";
        assert_eq!(
            trusted_structured(PRODUCT_URL, found(StructuredKind::Meta, naming)).as_deref(),
            Some(naming)
        );
    }

    #[test]
    fn search_pages_never_carry_structured_text() {
        let url = "https://sieportal.siemens.com/en-ww/search?q=6ES7131-6BF01-0BA0";
        let text = "6ES7131-6BF01-0BA0 digital input module";
        assert_eq!(trusted_structured(url, found(StructuredKind::Product, text)), None);
        assert_eq!(trusted_structured(url, found(StructuredKind::Meta, text)), None);
    }

    /// Opens a guarded tab, then never finishes rendering.
    struct StalledTab {
        closed: StdMutex<Option<oneshot::Sender<()>>>,
    }

    #[async_trait]
    impl PageFetcher for StalledTab {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn fetch(&self, _url: &str) -> Result<RawDocument, FetchError> {
            let tx = self.closed.lock().unwrap().take();
            let _tab = TabGuard::new(async move {
                if let Some(tx) = tx {
                    let _ = tx.send(());
                }
            });
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("never".into())
        }
    }

    #[tokio::test]
    async fn tab_is_closed_when_fetch_times_out() {
        let (tx, rx) = oneshot::channel();
        let fetcher = StalledTab {
            closed: StdMutex::new(Some(tx)),
        };
        let policy = FetchPolicy {
            timeout: Duration::from_millis(20),
            not_loaded_retries: 0,
            not_loaded_delay: Duration::from_millis(1),
        };

        assert!(fetch_document(&fetcher, PRODUCT_URL, &policy).await.is_empty());
        assert!(
            matches!(tokio::time::timeout(Duration::from_secs(1), rx).await, Ok(Ok(()))),
            "tab close did not run"
        );
    }

    #[tokio::test]
    async fn explicit_close_runs_once() {
        let (tx, rx) = oneshot::channel();
        let tab = TabGuard::new(async move {
            let _ = tx.send(());
        });
        tab.close().await;
        assert!(rx.await.is_ok());
    }
}
