#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mlfb_describe::{Config, FetchError, PageFetcher, RawDocument, Retriever};

/// In-memory pages keyed by URL; unknown URLs answer 404.
#[derive(Default)]
pub struct FakePages {
    pages: HashMap<String, RawDocument>,
    requested: Mutex<Vec<String>>,
}

impl FakePages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, body: impl Into<String>) -> Self {
        self.with_document(url, RawDocument::from(body.into()))
    }

    pub fn with_document(mut self, url: &str, doc: RawDocument) -> Self {
        self.pages.insert(url.to_string(), doc);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakePages {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, url: &str) -> Result<RawDocument, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or(FetchError::Status(404))
    }
}

pub fn retriever(pages: Arc<FakePages>) -> Retriever {
    Retriever::new(pages, Config::default())
}

/// Plain prose of exactly `chars` characters with no technical vocabulary.
pub fn generic_text(chars: usize) -> String {
    let mut s = "lorem ipsum ".repeat(chars / 12 + 1);
    s.truncate(chars - 1);
    let s = s.trim_end().to_string();
    format!("{s}{}.", "x".repeat(chars - 1 - s.len()))
}

/// Technical prose of exactly `chars` characters.
pub fn technical_text(chars: usize) -> String {
    let mut s = "circuit breaker ".repeat(chars / 16 + 1);
    s.truncate(chars - 1);
    let s = s.trim_end().to_string();
    format!("{s}{}.", "x".repeat(chars - 1 - s.len()))
}

/// A product page: part number as title, then the description line.
pub fn product_page(mlfb: &str, description: &str) -> String {
    format!("Title: {mlfb} | Siemens\n\n# {mlfb}\n\n{description}\n\n## Specifications\n\n| Rated current | 100 A |\n")
}
