//! Multi-turn chat on top of the chat completion operation.
//!
//! A session owns its history exclusively. Each `reply` sends a snapshot
//! of the full history, so later session activity cannot mutate an
//! in-flight request.

use crate::client::FoundationModelClient;
use crate::request::{ChatCompletionRequest, ChatMessage};
use crate::response::ChatCompletionResponse;
use crate::{Error, Result};

#[derive(Debug)]
pub struct ChatSession {
    client: FoundationModelClient,
    template: ChatCompletionRequest,
    system_message: Option<String>,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    /// Send a user message and fold the assistant's reply into history.
    ///
    /// On failure the user entry stays in history (no rollback); the
    /// assistant entry is appended only after a successful reply.
    pub fn reply(&mut self, message: impl Into<String>) -> Result<ChatCompletionResponse> {
        self.history.push(ChatMessage::user(message));
        let mut request = self.template.clone();
        request.messages = self.history.clone();
        let response = self.client.chat_completion(&request)?;
        let content = response
            .message()
            .map(str::to_string)
            .ok_or_else(|| Error::Decode {
                url: None,
                message: "chat completion response has no choices[0].message.content".to_string(),
            })?;
        self.history.push(ChatMessage::assistant(content));
        Ok(response)
    }

    /// The entire chat history, system message first if one was set.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The last assistant reply, or `""` before the first round completes.
    pub fn last(&self) -> &str {
        if self.history.len() <= 1 {
            return "";
        }
        self.history
            .last()
            .map(|entry| entry.content.as_str())
            .unwrap_or("")
    }

    /// Number of completed chat rounds.
    pub fn count(&self) -> usize {
        self.history.len() / 2
    }

    pub fn system_message(&self) -> Option<&str> {
        self.system_message.as_deref()
    }

    /// Role-prefixed transcript, one line per entry.
    pub fn pretty_history(&self) -> String {
        let mut out = String::new();
        for entry in &self.history {
            out.push('\n');
            out.push_str(&format!("{}: {}", entry.role, entry.content));
        }
        out
    }
}

/// Builds a [`ChatSession`] with a fixed parameter set.
///
/// Streaming is rejected here, at construction: multi-turn accounting
/// needs a complete assistant message per round.
pub struct ChatSessionBuilder {
    client: FoundationModelClient,
    template: ChatCompletionRequest,
    system_message: Option<String>,
}

impl ChatSessionBuilder {
    pub(crate) fn new(client: FoundationModelClient, model: impl Into<String>) -> Self {
        Self {
            client,
            template: ChatCompletionRequest::new(model, Vec::new()),
            system_message: None,
        }
    }

    pub fn system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.template = self.template.user(user);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.template = self.template.max_tokens(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.template = self.template.temperature(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.template = self.template.top_p(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.template = self.template.top_k(top_k);
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.template = self.template.stream(stream);
        self
    }

    pub fn stop(mut self, stop: impl Into<crate::request::StringOrList>) -> Self {
        self.template = self.template.stop(stop);
        self
    }

    pub fn n(mut self, n: u32) -> Self {
        self.template = self.template.n(n);
        self
    }

    pub fn timeout(mut self, timeout: u64) -> Self {
        self.template = self.template.timeout(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.template = self.template.max_retries(max_retries);
        self
    }

    pub fn build(self) -> Result<ChatSession> {
        if self.template.stream == Some(true) {
            return Err(Error::Unsupported(
                "streaming is not supported for ChatSession".to_string(),
            ));
        }
        let history = match &self.system_message {
            Some(message) => vec![ChatMessage::system(message.clone())],
            None => Vec::new(),
        };
        Ok(ChatSession {
            client: self.client,
            template: self.template,
            system_message: self.system_message,
            history,
        })
    }
}
