use rmcp::schemars;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DescribePartRequest {
    /// Siemens order number (MLFB), e.g. 3VA2110-5HL32-0AA0
    pub mlfb: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    PrimaryPortal,
    SecondaryCatalog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCandidate {
    pub url: String,
    pub locale: String,
    pub kind: SourceKind,
}

impl SourceCandidate {
    pub fn new(url: impl Into<String>, locale: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            url: url.into(),
            locale: locale.into(),
            kind,
        }
    }
}

/// One fetched page: its visible text, plus a description the page embeds
/// as structured data when the backend can read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDocument {
    pub text: String,
    pub structured: Option<String>,
}

impl RawDocument {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.structured.is_none()
    }
}

impl From<String> for RawDocument {
    fn from(text: String) -> Self {
        Self {
            text,
            structured: None,
        }
    }
}

impl From<&str> for RawDocument {
    fn from(text: &str) -> Self {
        text.to_string().into()
    }
}

/// A description extracted from one document, with the page it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub source_url: String,
    pub score: f64,
}

/// Outcome of one lookup after finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lookup {
    pub description: String,
    pub source: String,
}

/// JSON body shared by every response of the describe endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescribeResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    pub description: String,
}

impl DescribeResponse {
    pub fn found(lookup: Lookup) -> Self {
        Self {
            ok: true,
            source: Some(lookup.source),
            msg: None,
            description: lookup.description,
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            source: None,
            msg: Some(msg.into()),
            description: String::new(),
        }
    }
}
