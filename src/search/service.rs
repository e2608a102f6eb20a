use crate::search::{
    check_query, DemoBackend, Error, ErrorCode, ResponseParser, SearchBackend, SearchError,
    SearchOptions, SearchResult, WebSearchClient, MAX_ALLOWED_DOMAINS,
};
use std::sync::Arc;
use std::time::Instant;

/// Public entry point of the search pipeline
///
/// Enforces input policy, then runs backend and parser. Callers see exactly
/// two failure shapes: [`Error::InvalidInput`] for their own mistakes and
/// [`Error::Search`] for everything else.
#[derive(Clone)]
pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    parser: ResponseParser,
}

impl SearchService {
    /// Service backed by the real Responses API client
    pub fn new(api_key: &str) -> Result<Self, Error> {
        Ok(Self::from_client(WebSearchClient::new(api_key)?))
    }

    pub fn from_client(client: WebSearchClient) -> Self {
        Self::with_backend(Arc::new(client))
    }

    pub fn with_backend(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            parser: ResponseParser::new(),
        }
    }

    /// Service answering from canned data, no network
    pub fn demo() -> Self {
        Self::with_backend(Arc::new(DemoBackend))
    }

    pub fn parser(&self) -> &ResponseParser {
        &self.parser
    }

    pub fn validate_query(&self, query: &str) -> bool {
        check_query(query).is_ok()
    }

    pub async fn search(
        &self,
        query: &str,
        options: Option<SearchOptions>,
    ) -> Result<SearchResult, Error> {
        check_query(query)?;
        let options = options.unwrap_or_default();

        tracing::info!(
            model = %options.model,
            query_len = query.chars().count(),
            "starting web search"
        );
        let started = Instant::now();

        let outcome = match self.backend.search(query, &options).await {
            Ok(response) => self.parser.parse(&response, query).map_err(Error::from),
            Err(e) => Err(wrap_backend_error(e)),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(result) => tracing::info!(
                elapsed_ms,
                citations = result.citations.len(),
                sources = result.sources.len(),
                search_id = %result.search_id,
                "web search completed"
            ),
            Err(e) => tracing::warn!(elapsed_ms, error = %e, "web search failed"),
        }

        outcome
    }

    /// Build options restricted to `domains`
    ///
    /// Entries must be bare domains: no scheme, no whitespace, at most
    /// [`MAX_ALLOWED_DOMAINS`] of them.
    pub fn apply_domain_filters<S: AsRef<str>>(&self, domains: &[S]) -> Result<SearchOptions, Error> {
        if domains.len() > MAX_ALLOWED_DOMAINS {
            return Err(Error::invalid(format!(
                "Too many domains (max {MAX_ALLOWED_DOMAINS} allowed)"
            )));
        }

        for domain in domains {
            let domain = domain.as_ref();
            if domain.starts_with("http://") || domain.starts_with("https://") {
                return Err(Error::invalid(format!(
                    "Invalid domain '{domain}': remove http:// or https:// prefix"
                )));
            }
            if domain.is_empty() || domain.chars().any(char::is_whitespace) {
                return Err(Error::invalid(format!("Invalid domain format: '{domain}'")));
            }
        }

        let allowed = domains.iter().map(|d| d.as_ref().to_string()).collect();
        Ok(SearchOptions::default().with_allowed_domains(allowed))
    }
}

/// Pick the real service when a key is available, else the demo if allowed
///
/// `configure` adjusts the HTTP client (base URL, timeout, ...) before it is
/// handed to the service; it is not called in demo mode.
pub fn create_search_service<F>(
    api_key: Option<&str>,
    allow_demo: bool,
    configure: F,
) -> Result<SearchService, Error>
where
    F: FnOnce(WebSearchClient) -> WebSearchClient,
{
    match api_key.filter(|key| !key.trim().is_empty()) {
        Some(key) => Ok(SearchService::from_client(configure(WebSearchClient::new(key)?))),
        None if allow_demo => {
            tracing::info!("no API key available, using demo search backend");
            Ok(SearchService::demo())
        }
        None => Err(Error::invalid("API key is required")),
    }
}

fn wrap_backend_error(err: anyhow::Error) -> Error {
    let err = match err.downcast::<Error>() {
        Ok(typed) => return typed,
        Err(other) => other,
    };
    let err = match err.downcast::<SearchError>() {
        Ok(search) => return Error::Search(search),
        Err(other) => other,
    };

    tracing::error!(error = %format!("{err:#}"), "unexpected search backend failure");

    Error::Search(
        SearchError::new(
            ErrorCode::UnknownError,
            format!("Search operation failed: {err}"),
        )
        .with_detail("original_error", format!("{err:#}")),
    )
}
