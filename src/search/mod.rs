pub mod client;
pub mod demo;
pub mod error;
pub mod models;
pub mod parser;
pub mod service;
pub mod wire;

pub use client::WebSearchClient;
pub use demo::DemoBackend;
pub use error::{Error, ErrorCode, SearchError};
pub use models::{Citation, ReasoningEffort, SearchOptions, SearchResult, Source};
pub use parser::ResponseParser;
pub use service::{create_search_service, SearchService};

use wire::ResponseBody;

/// Longest accepted query, in characters
pub const MAX_QUERY_CHARS: usize = 5000;

/// Maximum number of entries in a domain allow-list
pub const MAX_ALLOWED_DOMAINS: usize = 20;

/// Search backend abstraction - the real API client, the demo backend and
/// test doubles all plug in here
///
/// Errors that are already an [`Error`] pass through the service untouched;
/// anything else is wrapped as `UNKNOWN_ERROR`.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Perform one search and return the decoded response
    async fn search(&self, query: &str, options: &SearchOptions) -> anyhow::Result<ResponseBody>;
}

pub(crate) fn check_query(query: &str) -> Result<(), Error> {
    if query.trim().is_empty() {
        return Err(Error::invalid("Query cannot be empty"));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(Error::invalid(format!(
            "Query too long (max {MAX_QUERY_CHARS} characters)"
        )));
    }
    Ok(())
}
