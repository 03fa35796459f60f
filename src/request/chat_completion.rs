//! Chat completion request record.

use serde::{Deserialize, Serialize};

use super::{ChatMessage, ModelRequest, StringOrList};

/// Parameters for one chat completion call.
///
/// `messages` is the conversation so far, oldest first. Generation
/// parameters left unset are omitted from the request body, letting the
/// endpoint apply its own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StringOrList>,
    /// Number of completion choices to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Transport deadline, seconds. Control parameter, never serialized.
    #[serde(default, skip_serializing)]
    pub timeout: Option<u64>,
    /// Attempt budget. Control parameter, never serialized.
    #[serde(default, skip_serializing)]
    pub max_retries: Option<u32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            user: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            top_k: None,
            stream: None,
            stop: None,
            n: None,
            timeout: None,
            max_retries: None,
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    pub fn stop(mut self, stop: impl Into<StringOrList>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    pub fn n(mut self, n: u32) -> Self {
        self.n = Some(n);
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

impl ModelRequest for ChatCompletionRequest {
    const SUPPORTED_MODELS: &'static [&'static str] =
        &["llama-2-70b-chat", "mixtral-8x7b-instruct", "dbrx-instruct"];

    fn model(&self) -> &str {
        &self.model
    }

    fn timeout(&self) -> Option<u64> {
        self.timeout
    }

    fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    fn stream(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}
