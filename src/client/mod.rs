//! The Foundation Model API client.
//!
//! [`FoundationModelClient`] owns the workspace configuration, the
//! environment-override snapshot, and (optionally) caller-supplied
//! transport clients. Every operation exists in a blocking form and an
//! async twin with identical observable behavior.

mod execution;
mod stream;

pub use stream::{AsyncResponseStream, ResponseStream};

use crate::chat_session::ChatSessionBuilder;
use crate::config::WorkspaceConfig;
use crate::endpoint::EnvOverrides;
use crate::request::{ChatCompletionRequest, CompletionRequest, EmbeddingRequest};
use crate::response::{
    ChatCompletionChunk, ChatCompletionResponse, CompletionChunk, CompletionResponse,
    EmbeddingResponse,
};
use crate::Result;

#[derive(Debug, Clone)]
pub struct FoundationModelClient {
    workspace: WorkspaceConfig,
    overrides: EnvOverrides,
    http: Option<reqwest::blocking::Client>,
    http_async: Option<reqwest::Client>,
}

impl FoundationModelClient {
    /// Client with default shared transport clients and overrides read
    /// from the environment.
    pub fn new(workspace: WorkspaceConfig) -> Self {
        Self {
            workspace,
            overrides: EnvOverrides::from_env(),
            http: None,
            http_async: None,
        }
    }

    pub fn builder(workspace: WorkspaceConfig) -> FoundationModelClientBuilder {
        FoundationModelClientBuilder {
            workspace,
            overrides: None,
            http: None,
            http_async: None,
        }
    }

    pub(crate) fn workspace(&self) -> &WorkspaceConfig {
        &self.workspace
    }

    pub(crate) fn overrides(&self) -> &EnvOverrides {
        &self.overrides
    }

    pub(crate) fn http_client(&self) -> Option<&reqwest::blocking::Client> {
        self.http.as_ref()
    }

    pub(crate) fn async_http_client(&self) -> Option<&reqwest::Client> {
        self.http_async.as_ref()
    }

    /// Blocking chat completion.
    pub fn chat_completion(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        self.execute_buffered(request)
    }

    /// Blocking streamed chat completion.
    pub fn chat_completion_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ResponseStream<ChatCompletionChunk>> {
        self.execute_streaming(request)
    }

    /// Async chat completion.
    pub async fn chat_completion_async(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.execute_buffered_async(request).await
    }

    /// Async streamed chat completion.
    pub async fn chat_completion_stream_async(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<AsyncResponseStream<ChatCompletionChunk>> {
        self.execute_streaming_async(request).await
    }

    /// Blocking text completion.
    pub fn completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.execute_buffered(request)
    }

    /// Blocking streamed text completion.
    pub fn completion_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<ResponseStream<CompletionChunk>> {
        self.execute_streaming(request)
    }

    /// Async text completion.
    pub async fn completion_async(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.execute_buffered_async(request).await
    }

    /// Async streamed text completion.
    pub async fn completion_stream_async(
        &self,
        request: &CompletionRequest,
    ) -> Result<AsyncResponseStream<CompletionChunk>> {
        self.execute_streaming_async(request).await
    }

    /// Blocking embedding. Embedding has no streaming mode.
    pub fn embedding(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        self.execute_buffered(request)
    }

    /// Async embedding.
    pub async fn embedding_async(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        self.execute_buffered_async(request).await
    }

    /// Start building a multi-turn chat session on this client.
    pub fn chat_session(&self, model: impl Into<String>) -> ChatSessionBuilder {
        ChatSessionBuilder::new(self.clone(), model)
    }
}

/// Builder for clients needing custom transport clients or a fixed
/// override set (tests inject [`EnvOverrides::none`] here).
pub struct FoundationModelClientBuilder {
    workspace: WorkspaceConfig,
    overrides: Option<EnvOverrides>,
    http: Option<reqwest::blocking::Client>,
    http_async: Option<reqwest::Client>,
}

impl FoundationModelClientBuilder {
    pub fn env_overrides(mut self, overrides: EnvOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.http = Some(client);
        self
    }

    pub fn async_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_async = Some(client);
        self
    }

    pub fn build(self) -> FoundationModelClient {
        FoundationModelClient {
            workspace: self.workspace,
            overrides: self.overrides.unwrap_or_else(EnvOverrides::from_env),
            http: self.http,
            http_async: self.http_async,
        }
    }
}
