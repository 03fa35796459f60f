//! Text completion request record.

use serde::{Deserialize, Serialize};

use super::{ModelRequest, StringOrList};

/// Parameters for one text completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionRequest {
    pub model: String,
    /// The prompt(s) to complete.
    pub prompt: StringOrList,
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
    pub n: Option<u32>,
    /// Appended to the end of every completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// Echo the prompt back in the completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,
    /// `"truncate"` or `"error"` on timeout / context overflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_behavior: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StringOrList>,
    /// Skip the prompt template and send the prompt raw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_raw_prompt: Option<bool>,
    /// Transport deadline, seconds. Control parameter, never serialized.
    #[serde(default, skip_serializing)]
    pub timeout: Option<u64>,
    /// Attempt budget. Control parameter, never serialized.
    #[serde(default, skip_serializing)]
    pub max_retries: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<StringOrList>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            user: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            top_k: None,
            stream: None,
            n: None,
            suffix: None,
            echo: None,
            error_behavior: None,
            stop: None,
            use_raw_prompt: None,
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

    pub fn n(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = Some(echo);
        self
    }

    pub fn error_behavior(mut self, error_behavior: impl Into<String>) -> Self {
        self.error_behavior = Some(error_behavior.into());
        self
    }

    pub fn stop(mut self, stop: impl Into<StringOrList>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    pub fn use_raw_prompt(mut self, use_raw_prompt: bool) -> Self {
        self.use_raw_prompt = Some(use_raw_prompt);
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

impl ModelRequest for CompletionRequest {
    const SUPPORTED_MODELS: &'static [&'static str] = &["mpt-7b-instruct", "mpt-30b-instruct"];

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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_accepts_string_or_list() {
        let one = CompletionRequest::from_value(json!({
            "model": "mpt-7b-instruct",
            "prompt": "hello",
        }))
        .unwrap();
        assert_eq!(one.prompt, StringOrList::One("hello".to_string()));

        let many = CompletionRequest::from_value(json!({
            "model": "mpt-7b-instruct",
            "prompt": ["a", "b"],
        }))
        .unwrap();
        assert_eq!(
            many.prompt,
            StringOrList::Many(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn missing_prompt_fails_validation() {
        let err =
            CompletionRequest::from_value(json!({"model": "mpt-7b-instruct"})).unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
    }

    #[test]
    fn body_keeps_operation_fields_only() {
        let body = CompletionRequest::new("mpt-7b-instruct", "once upon")
            .suffix(" The End")
            .echo(true)
            .timeout(10)
            .body()
            .unwrap();
        let map = body.as_object().unwrap();
        assert_eq!(map["prompt"], json!("once upon"));
        assert_eq!(map["suffix"], json!(" The End"));
        assert!(!map.contains_key("model"));
        assert!(!map.contains_key("timeout"));
    }
}
