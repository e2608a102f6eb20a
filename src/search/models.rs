use crate::search::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// How much computation the remote model should spend before answering
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    #[default]
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningEffort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            other => Err(Error::invalid(format!(
                "Invalid reasoning effort '{other}': expected low, medium or high"
            ))),
        }
    }
}

/// Per-request search configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Remote model identifier
    pub model: String,
    /// Restrict search to these domains (order preserved)
    pub allowed_domains: Option<Vec<String>>,
    /// Approximate user location, forwarded to the API as-is
    pub user_location: Option<serde_json::Map<String, serde_json::Value>>,
    pub reasoning_effort: ReasoningEffort,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            allowed_domains: None,
            user_location: None,
            reasoning_effort: ReasoningEffort::Low,
        }
    }
}

impl SearchOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    pub fn with_user_location(mut self, location: serde_json::Map<String, serde_json::Value>) -> Self {
        self.user_location = Some(location);
        self
    }

    pub fn with_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = effort;
        self
    }
}

/// Inline reference attached to a span of the answer text
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Citation {
    pub url: String,
    pub title: String,
    pub start_index: usize,
    pub end_index: usize,
}

impl Citation {
    /// Length of the cited span in characters
    pub fn length(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]({})", self.title, self.url)
    }
}

/// Document the remote model consulted while answering
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Source {
    pub url: String,
    #[serde(rename = "type")]
    pub source_type: String,
}

impl Source {
    /// Anything other than a plain web page (e.g. `oai-weather`)
    pub fn is_special(&self) -> bool {
        self.source_type != "web"
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.source_type)
    }
}

/// Parsed outcome of one query
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    pub query: String,
    pub text: String,
    pub citations: Vec<Citation>,
    pub sources: Vec<Source>,
    /// Id of the web search call; empty when the model did not search
    pub search_id: String,
    pub timestamp: DateTime<Utc>,
}

impl SearchResult {
    pub fn has_citations(&self) -> bool {
        !self.citations.is_empty()
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SearchResult(query='{}', citations={})",
            self.query,
            self.citations.len()
        )
    }
}
