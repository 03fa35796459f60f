//! Embedding request record.
//!
//! Embedding has no streaming mode: the record carries no `stream` field,
//! so a loose payload that includes one is rejected as an unknown field
//! during validation, before any network activity.

use serde::{Deserialize, Serialize};

use super::{ModelRequest, StringOrList};

/// Parameters for one embedding call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingRequest {
    pub model: String,
    /// The text(s) to embed.
    pub input: StringOrList,
    /// Task instruction embedded alongside the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Transport deadline, seconds. Control parameter, never serialized.
    #[serde(default, skip_serializing)]
    pub timeout: Option<u64>,
    /// Attempt budget. Control parameter, never serialized.
    #[serde(default, skip_serializing)]
    pub max_retries: Option<u32>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, input: impl Into<StringOrList>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            instruction: None,
            user: None,
            timeout: None,
            max_retries: None,
        }
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

impl ModelRequest for EmbeddingRequest {
    const SUPPORTED_MODELS: &'static [&'static str] = &["bge-large-en"];

    fn model(&self) -> &str {
        &self.model
    }

    fn timeout(&self) -> Option<u64> {
        self.timeout
    }

    fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stream_is_rejected_at_validation_time() {
        let err = EmbeddingRequest::from_value(json!({
            "model": "bge-large-en",
            "input": "embed me",
            "stream": true,
        }))
        .unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
    }

    #[test]
    fn instruction_is_sent_when_set() {
        let body = EmbeddingRequest::new("bge-large-en", "embed me")
            .instruction("Represent the sentence")
            .body()
            .unwrap();
        let map = body.as_object().unwrap();
        assert_eq!(map["input"], json!("embed me"));
        assert_eq!(map["instruction"], json!("Represent the sentence"));
        assert!(!map.contains_key("model"));
    }
}
