pub mod finalize;
pub mod sources;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use crate::browser::BrowserManager;
use crate::config::{Backend, Config};
use crate::constants::placeholder_description;
use crate::extractor::{collapse_whitespace, extract_description, is_good, score};
use crate::fetch::{FetchPolicy, PageFetcher, ReaderProxy, fetch_document};
use crate::models::{Candidate, Lookup, RawDocument, SourceKind};

pub use finalize::finalize;
pub use sources::{SourcePlan, sniff_crosslink};

/// Walks the source plan for a part number and keeps the best description.
#[derive(Clone)]
pub struct Retriever {
    fetcher: Arc<dyn PageFetcher>,
    policy: FetchPolicy,
    config: Config,
}

impl Retriever {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: Config) -> Self {
        Self {
            fetcher,
            policy: FetchPolicy::from_config(&config),
            config,
        }
    }

    /// Builds the retriever with the fetch backend selected in `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = match config.backend {
            Backend::Proxy => {
                Arc::new(ReaderProxy::new(&config).context("building reader proxy client")?)
            }
            Backend::Headless => Arc::new(BrowserManager::new(&config)),
        };
        Ok(Self::new(fetcher, config))
    }

    pub fn backend_name(&self) -> &'static str {
        self.fetcher.name()
    }

    pub fn threshold(&self) -> f64 {
        self.config.score_threshold
    }

    pub async fn describe(&self, mlfb: &str) -> Result<Lookup> {
        let mlfb = mlfb.trim();
        if mlfb.is_empty() {
            bail!("missing parameter");
        }
        let plan = SourcePlan::build(mlfb, &self.config);
        self.describe_with_plan(mlfb, &plan).await
    }

    /// Tries `plan` in order, stopping at the first candidate that reaches
    /// the threshold. Falls back to a placeholder when nothing was found.
    #[instrument(skip(self, plan), fields(backend = self.fetcher.name(), sources = plan.len()))]
    pub async fn describe_with_plan(&self, mlfb: &str, plan: &SourcePlan) -> Result<Lookup> {
        for source in &plan.sources {
            url::Url::parse(&source.url)
                .with_context(|| format!("invalid source url '{}'", source.url))?;
        }

        let best = self.best_candidate(mlfb, plan).await;

        let (description, source) = if best.text.is_empty() {
            info!("no usable description, answering with placeholder");
            (placeholder_description(mlfb), String::new())
        } else {
            info!(score = best.score, source = %best.source_url, "description found");
            (best.text, best.source_url)
        };

        Ok(Lookup {
            description: finalize(mlfb, &description),
            source,
        })
    }

    async fn best_candidate(&self, mlfb: &str, plan: &SourcePlan) -> Candidate {
        let threshold = self.threshold();
        let mut best = Candidate::default();
        // Each URL is fetched at most once per lookup
        let mut tried: HashSet<String> = HashSet::new();

        for source in &plan.sources {
            if !tried.insert(source.url.clone()) {
                debug!("{} already tried", source.url);
                continue;
            }
            let doc = fetch_document(self.fetcher.as_ref(), &source.url, &self.policy).await;
            if doc.is_empty() {
                debug!("{} gave nothing", source.url);
                continue;
            }

            if let Some(link) = sniff_crosslink(source.kind, &doc.text, mlfb)
                .filter(|link| !tried.contains(link))
            {
                debug!("{} links to {}", source.url, link);
                tried.insert(link.clone());
                let linked = fetch_document(self.fetcher.as_ref(), &link, &self.policy).await;
                consider_document(&mut best, &linked, mlfb, SourceKind::PrimaryPortal, &link);
                if best.score >= threshold {
                    break;
                }
            }

            consider_document(&mut best, &doc, mlfb, source.kind, &source.url);
            if best.score >= threshold {
                break;
            }
        }
        best
    }
}

/// Scores the page's structured description and its extracted paragraph as
/// separate candidates.
fn consider_document(
    best: &mut Candidate,
    doc: &RawDocument,
    mlfb: &str,
    kind: SourceKind,
    url: &str,
) {
    if let Some(structured) = &doc.structured {
        keep_better(best, structured_candidate(structured, url));
    }
    keep_better(best, candidate(&doc.text, mlfb, kind, url));
}

fn structured_candidate(structured: &str, url: &str) -> Candidate {
    let text = collapse_whitespace(structured);
    if !is_good(&text) {
        return Candidate::default();
    }
    let score = score(&text);
    debug!(score, "structured candidate from {}", url);
    Candidate {
        text,
        source_url: url.to_string(),
        score,
    }
}

fn candidate(doc: &str, mlfb: &str, kind: SourceKind, url: &str) -> Candidate {
    let text = extract_description(doc, mlfb, kind);
    let score = score(&text);
    debug!(score, chars = text.chars().count(), "candidate from {}", url);
    Candidate {
        text,
        source_url: url.to_string(),
        score,
    }
}

/// Replaces `best` only on a strictly higher score.
fn keep_better(best: &mut Candidate, candidate: Candidate) {
    if !candidate.text.is_empty() && candidate.score > best.score {
        *best = candidate;
    }
}
