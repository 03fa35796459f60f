//! # databricks-genai-inference
//!
//! Client library for Databricks Foundation Model serving endpoints. It
//! exposes three model operations — chat completion, text completion, and
//! embedding — each as a buffered call or (where supported) an event
//! stream, in both blocking and async execution models, plus a stateful
//! [`ChatSession`] helper for multi-turn conversations.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use databricks_genai_inference::{
//!     ChatCompletionRequest, ChatMessage, FoundationModelClient, WorkspaceConfig,
//! };
//!
//! fn main() -> databricks_genai_inference::Result<()> {
//!     let client = FoundationModelClient::new(WorkspaceConfig::from_env()?);
//!
//!     let request = ChatCompletionRequest::new(
//!         "dbrx-instruct",
//!         vec![ChatMessage::user("Tell me about bears.")],
//!     )
//!     .max_tokens(128);
//!
//!     let response = client.chat_completion(&request)?;
//!     println!("{}", response.message().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Module organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Dispatch, retry, and response decoding for both execution models |
//! | [`request`] | Validated request records and builders |
//! | [`response`] | Typed wrappers over raw response payloads |
//! | [`endpoint`] | Model-identifier to URL resolution with env overrides |
//! | [`config`] | Workspace host and auth collaborator |
//! | [`chat_session`] | Stateful multi-turn chat helper |

pub mod chat_session;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod request;
pub mod response;

mod error;
mod retry;
mod transport;

pub use chat_session::{ChatSession, ChatSessionBuilder};
pub use client::{
    AsyncResponseStream, FoundationModelClient, FoundationModelClientBuilder, ResponseStream,
};
pub use config::WorkspaceConfig;
pub use endpoint::EnvOverrides;
pub use error::{Error, DEFAULT_ERROR_MESSAGE};
pub use request::{
    ChatCompletionRequest, ChatMessage, CompletionRequest, EmbeddingRequest, ModelRequest, Role,
    StringOrList,
};
pub use response::{
    ChatCompletionChunk, ChatCompletionResponse, CompletionChunk, CompletionResponse,
    EmbeddingResponse, FoundationModelObject,
};

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, Error>;
