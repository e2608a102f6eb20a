use crate::search::wire::{ContentPart, ResponseBody, ResponseItem, SearchAction};
use crate::search::{SearchBackend, SearchOptions};
use serde_json::json;

/// Offline backend returning a canned answer
///
/// Used when no API key is available and demo mode was requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoBackend;

impl DemoBackend {
    pub fn response_for(query: &str, options: &SearchOptions) -> ResponseBody {
        ResponseBody {
            id: "demo-1".to_string(),
            model: options.model.clone(),
            created_at: Some(0),
            output: vec![
                ResponseItem::Message {
                    id: Some("demo-msg-1".to_string()),
                    role: Some("assistant".to_string()),
                    content: vec![ContentPart::OutputText {
                        text: format!("Demo answer for: {query}"),
                        annotations: vec![json!({
                            "type": "url_citation",
                            "url": "https://example.com",
                            "title": "Example Domain",
                            "start_index": 0,
                            "end_index": 10
                        })],
                    }],
                },
                ResponseItem::WebSearchCall {
                    id: Some("demo-search-1".to_string()),
                    status: Some("completed".to_string()),
                    action: Some(SearchAction {
                        query: Some(query.to_string()),
                        sources: vec![json!({ "url": "https://example.com", "type": "web" })],
                    }),
                },
            ],
        }
    }
}

#[async_trait::async_trait]
impl SearchBackend for DemoBackend {
    async fn search(&self, query: &str, options: &SearchOptions) -> anyhow::Result<ResponseBody> {
        tracing::debug!(query = %query, "serving canned demo response");
        Ok(Self::response_for(query, options))
    }
}
