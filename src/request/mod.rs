//! Validated request records for the three model operations.
//!
//! Each record is built either through typed setter methods or from a loose
//! JSON payload via [`ModelRequest::from_value`]. Both paths enforce the
//! same rules: exactly the declared fields are accepted, required fields
//! must be present, and values must coerce to their declared types. A
//! request that fails these rules never reaches the network.

mod chat_completion;
mod completion;
mod embedding;

pub use chat_completion::ChatCompletionRequest;
pub use completion::CompletionRequest;
pub use embedding::EmbeddingRequest;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Default transport deadline, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default attempt budget. One attempt total, i.e. no retry.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => f.write_str("system"),
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// A field that accepts either one string or a list of strings
/// (`prompt`, `input`, `stop`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for StringOrList {
    fn from(value: &str) -> Self {
        StringOrList::One(value.to_string())
    }
}

impl From<String> for StringOrList {
    fn from(value: String) -> Self {
        StringOrList::One(value)
    }
}

impl From<Vec<String>> for StringOrList {
    fn from(value: Vec<String>) -> Self {
        StringOrList::Many(value)
    }
}

impl From<Vec<&str>> for StringOrList {
    fn from(value: Vec<&str>) -> Self {
        StringOrList::Many(value.into_iter().map(str::to_string).collect())
    }
}

/// Common surface of the per-operation request records.
pub trait ModelRequest: Serialize + Sized {
    /// Model identifiers eligible for the `databricks-` alias.
    const SUPPORTED_MODELS: &'static [&'static str];

    fn model(&self) -> &str;

    /// Transport deadline override, seconds.
    fn timeout(&self) -> Option<u64>;

    /// Attempt budget override.
    fn max_retries(&self) -> Option<u32>;

    /// Whether the request asks for a streamed response.
    fn stream(&self) -> bool {
        false
    }

    /// Validate a loose keyword-style payload into a typed record.
    ///
    /// Unknown keys, missing required fields, and un-coercible values all
    /// fail with [`Error::Validation`].
    fn from_value(value: Value) -> Result<Self>
    where
        Self: DeserializeOwned,
    {
        serde_json::from_value(value).map_err(|e| Error::Validation(e.to_string()))
    }

    /// Serialize the outgoing JSON body.
    ///
    /// Unset optional fields are omitted. `model` selects the endpoint and
    /// is removed; `timeout` and `max_retries` are control parameters and
    /// never serialize at all.
    fn body(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self).map_err(|e| Error::Validation(e.to_string()))?;
        match value.as_object_mut() {
            Some(map) => {
                map.remove("model");
            }
            None => {
                return Err(Error::Validation(
                    "request did not serialize to a JSON object".to_string(),
                ))
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_message_serializes_with_lowercase_role() {
        let msg = ChatMessage::assistant("hi");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "assistant", "content": "hi"})
        );
    }

    #[test]
    fn string_or_list_accepts_both_shapes() {
        let one: StringOrList = serde_json::from_value(json!("stop")).unwrap();
        assert_eq!(one, StringOrList::One("stop".to_string()));
        let many: StringOrList = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(many, StringOrList::Many(vec!["a".to_string(), "b".to_string()]));
    }
}
