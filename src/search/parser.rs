use crate::search::wire::{ContentPart, ResponseBody, ResponseItem};
use crate::search::{Citation, ErrorCode, SearchError, SearchResult, Source};
use serde_json::Value;

const RULE_WIDTH: usize = 80;
const MAX_DISPLAYED_SOURCES: usize = 5;

/// Turns a decoded API response into a [`SearchResult`]
///
/// Optional parts of the response degrade to empty values; only a response
/// with no output at all is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, response: &ResponseBody, query: &str) -> Result<SearchResult, SearchError> {
        if response.output.is_empty() {
            return Err(SearchError::new(
                ErrorCode::MalformedResponse,
                "No output in response",
            )
            .with_detail("response_id", response.id.clone()));
        }

        let mut text = String::new();
        let mut citations = Vec::new();

        let message = response.output.iter().find_map(|item| match item {
            ResponseItem::Message { content, .. } => Some(content),
            _ => None,
        });

        if let Some(content) = message {
            for part in content {
                if let ContentPart::OutputText { text: fragment, annotations } = part {
                    text.push_str(fragment);
                    citations.extend(annotations.iter().filter_map(parse_citation));
                }
            }
        } else {
            tracing::debug!(response_id = %response.id, "response has no message item");
        }

        let (search_id, sources) = response
            .output
            .iter()
            .find_map(|item| match item {
                ResponseItem::WebSearchCall { id, action, .. } => {
                    let sources: Vec<Source> = action
                        .as_ref()
                        .map(|a| a.sources.iter().filter_map(parse_source).collect())
                        .unwrap_or_default();
                    Some((id.clone().unwrap_or_default(), sources))
                }
                _ => None,
            })
            .unwrap_or_default();

        tracing::debug!(
            response_id = %response.id,
            text_len = text.len(),
            citations = citations.len(),
            sources = sources.len(),
            "parsed search response"
        );

        Ok(SearchResult {
            query: query.to_string(),
            text,
            citations,
            sources,
            search_id,
            timestamp: chrono::Utc::now(),
        })
    }

    /// Render a result as a plain-text report
    pub fn format_for_display(&self, result: &SearchResult) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![
            rule.clone(),
            format!("Query: {}", result.query),
            rule.clone(),
            String::new(),
            "Result:".to_string(),
            result.text.clone(),
            String::new(),
        ];

        if result.has_citations() {
            lines.push("Citations:".to_string());
            for (idx, citation) in result.citations.iter().enumerate() {
                lines.push(format!("  [{}] {}", idx + 1, citation.title));
                lines.push(format!("      {}", citation.url));
            }
        } else {
            lines.push("Citations: None".to_string());
        }
        lines.push(String::new());

        if !result.sources.is_empty() {
            lines.push(format!("Sources ({} total):", result.sources.len()));
            for source in result.sources.iter().take(MAX_DISPLAYED_SOURCES) {
                lines.push(format!("  - {source}"));
            }
            if result.sources.len() > MAX_DISPLAYED_SOURCES {
                lines.push(format!(
                    "  ... and {} more",
                    result.sources.len() - MAX_DISPLAYED_SOURCES
                ));
            }
        }

        lines.push(rule);
        lines.join("\n")
    }
}

/// Build a citation from one annotation entry
///
/// Returns `None` for anything that is not a complete `url_citation`.
pub fn parse_citation(entry: &Value) -> Option<Citation> {
    if entry.get("type")?.as_str()? != "url_citation" {
        return None;
    }

    let start_index = usize::try_from(entry.get("start_index")?.as_u64()?).ok()?;
    let end_index = usize::try_from(entry.get("end_index")?.as_u64()?).ok()?;
    if end_index < start_index {
        tracing::trace!(start_index, end_index, "skipping citation with inverted span");
        return None;
    }

    Some(Citation {
        url: entry.get("url")?.as_str()?.to_string(),
        title: entry.get("title")?.as_str()?.to_string(),
        start_index,
        end_index,
    })
}

/// Build a source from one `action.sources` entry; `type` defaults to `web`
pub fn parse_source(entry: &Value) -> Option<Source> {
    let url = entry.get("url")?.as_str()?;
    let source_type = entry
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("web");

    Some(Source {
        url: url.to_string(),
        source_type: source_type.to_string(),
    })
}
