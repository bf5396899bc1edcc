use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{Config, SourceOrder};
use crate::constants::{CATALOG_BASE, PORTAL_BASE};
use crate::extractor::normalize::mentions_code;
use crate::models::{SourceCandidate, SourceKind};

lazy_static! {
    static ref PORTAL_LINK: Regex =
        Regex::new(r"(?i)https?://sieportal\.siemens\.com/[^\s)\]>]+").unwrap();
    static ref PORTAL_PRODUCT_LINK: Regex =
        Regex::new(r"(?i)https?://sieportal\.siemens\.com/[a-z-]+/product/[^\s)\]>]+").unwrap();
}

pub fn portal_product_url(locale: &str, mlfb: &str) -> String {
    format!("{PORTAL_BASE}/{locale}/product/{}", urlencoding::encode(mlfb))
}

pub fn portal_search_url(locale: &str, mlfb: &str) -> String {
    format!("{PORTAL_BASE}/{locale}/search?q={}", urlencoding::encode(mlfb))
}

pub fn catalog_url(lang: &str, mlfb: &str) -> String {
    format!(
        "{CATALOG_BASE}/{lang}/ww/Catalog/Product/?mlfb={}",
        urlencoding::encode(mlfb)
    )
}

/// Ordered list of pages to try for one part number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePlan {
    pub sources: Vec<SourceCandidate>,
}

impl SourcePlan {
    pub fn new(sources: Vec<SourceCandidate>) -> Self {
        Self { sources }
    }

    /// Portal product page then portal search per locale; catalog per language.
    pub fn build(mlfb: &str, config: &Config) -> Self {
        let portal = config.portal_locales.iter().flat_map(|locale| {
            [
                SourceCandidate::new(
                    portal_product_url(locale, mlfb),
                    locale.as_str(),
                    SourceKind::PrimaryPortal,
                ),
                SourceCandidate::new(
                    portal_search_url(locale, mlfb),
                    locale.as_str(),
                    SourceKind::PrimaryPortal,
                ),
            ]
        });
        let catalog = config.catalog_langs.iter().map(|lang| {
            SourceCandidate::new(catalog_url(lang, mlfb), lang.as_str(), SourceKind::SecondaryCatalog)
        });

        let sources = match config.source_order {
            SourceOrder::PortalFirst => portal.chain(catalog).collect(),
            SourceOrder::CatalogFirst => catalog.chain(portal).collect(),
        };
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Portal page referenced from `text`, if any.
///
/// Portal documents (search result pages) only yield product links naming
/// the part number; product pages also link accessories, which must not be
/// followed. Catalog pages prefer a link naming the part number and fall
/// back to the first portal link.
pub fn sniff_crosslink(kind: SourceKind, text: &str, mlfb: &str) -> Option<String> {
    let re = match kind {
        SourceKind::PrimaryPortal => &*PORTAL_PRODUCT_LINK,
        SourceKind::SecondaryCatalog => &*PORTAL_LINK,
    };
    let links: Vec<&str> = re
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', '"', '\'']))
        .collect();

    let naming = links.iter().find(|link| mentions_code(link, mlfb));

    let picked = match kind {
        SourceKind::PrimaryPortal => naming,
        SourceKind::SecondaryCatalog => naming.or(links.first()),
    };
    picked.map(|link| link.to_string())
}
