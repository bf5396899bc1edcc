use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::constants::{
    DEFAULT_CATALOG_LANGS, DEFAULT_PORTAL_LOCALES, DEFAULT_READER_BASE, DEFAULT_SCORE_THRESHOLD,
};

/// Which "fetch one source" implementation backs the retriever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Text-rendering proxy (markdown over HTTP).
    Proxy,
    /// Local headless Chromium.
    Headless,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proxy" | "reader" => Ok(Self::Proxy),
            "headless" | "browser" => Ok(Self::Headless),
            other => Err(anyhow!("unknown backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrder {
    /// Portal product/search pages, then the catalog.
    PortalFirst,
    /// Catalog pages first, following their cross-links to the portal.
    CatalogFirst,
}

impl FromStr for SourceOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portal-first" | "portal" => Ok(Self::PortalFirst),
            "catalog-first" | "catalog" => Ok(Self::CatalogFirst),
            other => Err(anyhow!("unknown source order '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub backend: Backend,
    pub source_order: SourceOrder,
    pub score_threshold: f64,
    pub fetch_timeout: Duration,
    pub not_loaded_retries: u32,
    pub not_loaded_delay: Duration,
    pub portal_locales: Vec<String>,
    pub catalog_langs: Vec<String>,
    pub reader_base: String,
    pub reader_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            backend: Backend::Proxy,
            source_order: SourceOrder::PortalFirst,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            fetch_timeout: Duration::from_secs(20),
            not_loaded_retries: 2,
            not_loaded_delay: Duration::from_millis(1500),
            portal_locales: DEFAULT_PORTAL_LOCALES.iter().map(|s| s.to_string()).collect(),
            catalog_langs: DEFAULT_CATALOG_LANGS.iter().map(|s| s.to_string()).collect(),
            reader_base: DEFAULT_READER_BASE.to_string(),
            reader_api_key: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MLFB_BIND_ADDR") {
            config.bind_addr = v
                .trim()
                .parse()
                .with_context(|| format!("MLFB_BIND_ADDR is not a socket address: {v}"))?;
        }
        if let Some(v) = get("MLFB_BACKEND") {
            config.backend = v.parse().context("MLFB_BACKEND")?;
        }
        if let Some(v) = get("MLFB_SOURCE_ORDER") {
            config.source_order = v.parse().context("MLFB_SOURCE_ORDER")?;
        }
        if let Some(v) = get("MLFB_SCORE_THRESHOLD") {
            let threshold: f64 = v
                .trim()
                .parse()
                .with_context(|| format!("MLFB_SCORE_THRESHOLD is not a number: {v}"))?;
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(anyhow!("MLFB_SCORE_THRESHOLD must be a non-negative number"));
            }
            config.score_threshold = threshold;
        }
        if let Some(v) = get("MLFB_FETCH_TIMEOUT_SECS") {
            let secs: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("MLFB_FETCH_TIMEOUT_SECS is not an integer: {v}"))?;
            config.fetch_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(v) = get("MLFB_NOT_LOADED_RETRIES") {
            config.not_loaded_retries = v
                .trim()
                .parse()
                .with_context(|| format!("MLFB_NOT_LOADED_RETRIES is not an integer: {v}"))?;
        }
        if let Some(v) = get("MLFB_NOT_LOADED_DELAY_MS") {
            let ms: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("MLFB_NOT_LOADED_DELAY_MS is not an integer: {v}"))?;
            config.not_loaded_delay = Duration::from_millis(ms);
        }
        if let Some(v) = get("MLFB_PORTAL_LOCALES") {
            config.portal_locales = split_list(&v);
        }
        if let Some(v) = get("MLFB_CATALOG_LANGS") {
            config.catalog_langs = split_list(&v);
        }
        if let Some(v) = get("MLFB_READER_BASE") {
            let base = v.trim().to_string();
            config.reader_base = if base.ends_with('/') { base } else { format!("{base}/") };
        }
        config.reader_api_key = get("JINA_API_KEY");

        if config.portal_locales.is_empty() && config.catalog_langs.is_empty() {
            return Err(anyhow!("no portal locales and no catalog languages configured"));
        }

        Ok(config)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
