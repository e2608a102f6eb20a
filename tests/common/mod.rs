//! Common test utilities and fixtures for the search pipeline
#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use websearch::search::wire::ResponseBody;
use websearch::search::{SearchBackend, SearchError, SearchOptions};

pub const TEST_API_KEY: &str = "sk-test-key-1234567890abcdef";

/// Response used by the end-to-end scenario
pub fn happy_path_response() -> Value {
    json!({
        "output": [
            {
                "type": "web_search_call",
                "id": "ws_1",
                "action": { "sources": [{ "url": "https://a.com", "type": "web" }] }
            },
            {
                "type": "message",
                "content": [{
                    "type": "output_text",
                    "text": "Answer.",
                    "annotations": [{
                        "type": "url_citation",
                        "url": "https://a.com",
                        "title": "A",
                        "start_index": 0,
                        "end_index": 6
                    }]
                }]
            }
        ]
    })
}

/// A fuller response: reasoning item, two citations, mixed source types
pub fn valid_search_response() -> Value {
    json!({
        "id": "resp_67c9fa0502748190b7dd390736892e100be649c1a5ff9609",
        "model": "gpt-4o-mini",
        "created_at": 1741487325,
        "output": [
            { "type": "reasoning", "id": "rs_1", "summary": [] },
            {
                "type": "web_search_call",
                "id": "ws_67c9fa0502748190b7dd390736892e100be649c1a5ff9609",
                "status": "completed",
                "action": {
                    "type": "search",
                    "query": "latest AI developments",
                    "sources": [
                        { "url": "https://techcrunch.com/2025/10/10/ai-breakthrough", "type": "web" },
                        { "url": "https://weather.example/api", "type": "oai-weather" }
                    ]
                }
            },
            {
                "type": "message",
                "id": "msg_1",
                "status": "completed",
                "role": "assistant",
                "content": [
                    {
                        "type": "output_text",
                        "text": "Recent AI developments include new models. ",
                        "annotations": [{
                            "type": "url_citation",
                            "url": "https://techcrunch.com/2025/10/10/ai-breakthrough",
                            "title": "Major AI Breakthrough Announced - TechCrunch",
                            "start_index": 0,
                            "end_index": 42
                        }]
                    },
                    {
                        "type": "output_text",
                        "text": "Industry adoption keeps growing.",
                        "annotations": [{
                            "type": "url_citation",
                            "url": "https://theverge.com/2025/10/10/innovation",
                            "title": "Innovation Continues - The Verge",
                            "start_index": 43,
                            "end_index": 75
                        }]
                    }
                ]
            }
        ]
    })
}

pub fn no_citations_response() -> Value {
    json!({
        "id": "resp_2",
        "output": [{
            "type": "message",
            "content": [{ "type": "output_text", "text": "Plain answer.", "annotations": [] }]
        }]
    })
}

pub fn body(value: Value) -> ResponseBody {
    serde_json::from_value(value).expect("fixture should decode")
}

/// What the mock backend does when called
#[derive(Clone)]
pub enum Behavior {
    Respond(Value),
    FailTyped(SearchError),
    FailUntyped(String),
}

/// Backend double that counts calls and records the options it received
pub struct MockBackend {
    behavior: Behavior,
    calls: AtomicUsize,
    last_options: Mutex<Option<SearchOptions>>,
}

impl MockBackend {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        })
    }

    pub fn responding(value: Value) -> Arc<Self> {
        Self::new(Behavior::Respond(value))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<SearchOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchBackend for MockBackend {
    async fn search(&self, _query: &str, options: &SearchOptions) -> anyhow::Result<ResponseBody> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options.clone());

        match &self.behavior {
            Behavior::Respond(value) => Ok(serde_json::from_value(value.clone())?),
            Behavior::FailTyped(err) => Err(err.clone().into()),
            Behavior::FailUntyped(msg) => Err(anyhow::anyhow!("{msg}")),
        }
    }
}

/// HTTP client that never goes through a proxy, for talking to a local mock server
pub fn direct_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to build HTTP client")
}

/// Test fixture for config and log files
pub struct TestFixture {
    /// Temporary directory that gets cleaned up automatically
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Create a test file with given content
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let filepath = self.path().join(name);
        std::fs::write(&filepath, content).expect("Failed to write test file");
        filepath
    }
}
