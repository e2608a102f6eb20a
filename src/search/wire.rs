//! Typed view of the Responses API body.
//!
//! Only the parts the parser reads are modelled; unknown item and content
//! types deserialize to `Other` so new API features do not break decoding.
//! Annotation and source entries stay as raw JSON because the parser skips
//! malformed ones individually instead of failing the whole response.
//! Lists tolerate `null`, and an `output` or `content` entry that does not
//! decode is dropped on its own.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level response returned by `POST /responses`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ResponseBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub output: Vec<ResponseItem>,
}

/// One entry of the `output` list
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseItem {
    Message {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        role: Option<String>,
        #[serde(default, deserialize_with = "lenient_list")]
        content: Vec<ContentPart>,
    },
    WebSearchCall {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        action: Option<SearchAction>,
    },
    #[serde(other)]
    Other,
}

/// One part of a message's content
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText {
        #[serde(default, deserialize_with = "null_as_default")]
        text: String,
        #[serde(default, deserialize_with = "null_as_default")]
        annotations: Vec<Value>,
    },
    #[serde(other)]
    Other,
}

/// What the web search call did
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchAction {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode each entry on its own, dropping the ones that do not fit `T`
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Vec<Value> = null_as_default(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "skipping undecodable response entry");
                None
            }
        })
        .collect())
}
