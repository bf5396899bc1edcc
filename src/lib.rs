pub mod browser;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod http;
pub mod models;
pub mod server;
pub mod strategy;

pub use config::Config;
pub use error::FetchError;
pub use fetch::PageFetcher;
pub use models::{Candidate, DescribeResponse, Lookup, RawDocument, SourceCandidate, SourceKind};
pub use strategy::Retriever;
