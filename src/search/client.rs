use crate::logging::redact_secrets;
use crate::search::wire::ResponseBody;
use crate::search::{
    check_query, Error, ErrorCode, ReasoningEffort, SearchBackend, SearchError, SearchOptions,
};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the OpenAI Responses API with the `web_search` tool enabled
///
/// Performs exactly one HTTP round trip per [`search`](Self::search) call and
/// holds no state between calls. The credential is always passed in by the
/// caller; this type never reads the environment.
#[derive(Clone)]
pub struct WebSearchClient {
    http: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl WebSearchClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::invalid("API key must be provided"));
        }

        Ok(Self {
            http: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, ...)
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Format check only; does not contact the API
    pub fn validate_api_key(&self) -> bool {
        self.api_key.starts_with("sk-") && self.api_key.len() > 20
    }

    /// Run one web-search-augmented completion
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<ResponseBody, Error> {
        check_query(query)?;

        let url = format!("{}/responses", self.base_url);
        let request = CreateResponseRequest::new(query, options);

        tracing::debug!(
            url = %url,
            model = %options.model,
            query_len = query.chars().count(),
            domain_filter = options.allowed_domains.as_ref().map(|d| d.len()).unwrap_or(0),
            reasoning_effort = %options.reasoning_effort,
            "responses api request"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| error_for_transport(&e, self.timeout))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| error_for_transport(&e, self.timeout))?;

        if !status.is_success() {
            let body = redact_secrets(&body);
            tracing::warn!(status = %status, error = %body, "responses api returned error");
            return Err(error_for_status(status, retry_after, &body).into());
        }

        let decoded: ResponseBody = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "failed to decode responses api body");
            SearchError::new(
                ErrorCode::MalformedResponse,
                format!("Could not decode API response: {e}"),
            )
            .with_detail("original_error", e.to_string())
        })?;

        tracing::debug!(
            response_id = %decoded.id,
            output_items = decoded.output.len(),
            "responses api request completed"
        );

        Ok(decoded)
    }
}

#[async_trait::async_trait]
impl SearchBackend for WebSearchClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> anyhow::Result<ResponseBody> {
        Ok(WebSearchClient::search(self, query, options).await?)
    }
}

/// Request body for `POST /responses`
#[derive(Debug, Serialize)]
struct CreateResponseRequest<'a> {
    model: &'a str,
    input: &'a str,
    tools: Vec<WebSearchToolSpec<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<Reasoning>,
    include: [&'static str; 1],
}

#[derive(Debug, Serialize)]
struct WebSearchToolSpec<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<DomainFilters<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_location: Option<&'a serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct DomainFilters<'a> {
    allowed_domains: &'a [String],
}

#[derive(Debug, Serialize)]
struct Reasoning {
    effort: ReasoningEffort,
}

impl<'a> CreateResponseRequest<'a> {
    fn new(query: &'a str, options: &'a SearchOptions) -> Self {
        let filters = options
            .allowed_domains
            .as_deref()
            .filter(|domains| !domains.is_empty())
            .map(|allowed_domains| DomainFilters { allowed_domains });

        let user_location = options
            .user_location
            .as_ref()
            .filter(|location| !location.is_empty());

        // `low` is the API default, so it is left implicit.
        let reasoning = (options.reasoning_effort != ReasoningEffort::Low).then_some(Reasoning {
            effort: options.reasoning_effort,
        });

        Self {
            model: &options.model,
            input: query,
            tools: vec![WebSearchToolSpec {
                tool_type: "web_search",
                filters,
                user_location,
            }],
            reasoning,
            include: ["web_search_call.action.sources"],
        }
    }
}

fn error_for_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> SearchError {
    let api_message = api_error_message(body);

    let error = match status.as_u16() {
        401 | 403 => SearchError::new(
            ErrorCode::AuthFailed,
            "Invalid API key or authentication failed",
        ),
        429 => {
            let error = SearchError::new(ErrorCode::RateLimit, "API rate limit exceeded");
            match retry_after {
                Some(secs) => error.with_detail("retry_after", secs),
                None => error,
            }
        }
        _ => SearchError::new(
            ErrorCode::ApiError,
            format!(
                "API request failed ({status}): {}",
                api_message.as_deref().unwrap_or("no error message")
            ),
        ),
    };

    error
        .with_detail("status", status.as_u16())
        .with_detail("original_error", api_message.unwrap_or_else(|| body.to_string()))
}

/// Pull `error.message` out of an OpenAI error body
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(str::to_string)
}

fn error_for_transport(err: &reqwest::Error, timeout: Duration) -> SearchError {
    let detail = redact_secrets(&err.to_string());

    if err.is_timeout() {
        SearchError::new(
            ErrorCode::ApiError,
            format!("Request timed out after {timeout:?}"),
        )
        .with_detail("timeout_ms", timeout.as_millis() as u64)
        .with_detail("original_error", detail)
    } else if err.is_builder() {
        SearchError::new(ErrorCode::UnknownError, format!("Unexpected error: {detail}"))
            .with_detail("original_error", detail)
    } else {
        SearchError::new(ErrorCode::ApiError, format!("API request failed: {detail}"))
            .with_detail("original_error", detail)
    }
}
