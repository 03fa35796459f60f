//! Typed wrappers over raw API response payloads.
//!
//! Each object stores the parsed JSON payload as-is and exposes typed
//! accessors computed on demand. Accessors are idempotent projections and
//! return `Option` rather than assuming the payload shape.

use serde_json::Value;

/// Common surface of buffered responses and stream chunks.
pub trait FoundationModelObject: Sized {
    /// Wrap a parsed payload.
    fn from_json(payload: Value) -> Self;

    /// The raw payload.
    fn json(&self) -> &Value;

    /// Response id.
    fn id(&self) -> Option<&str> {
        self.json().get("id")?.as_str()
    }

    /// Name of the model that produced the response.
    fn model(&self) -> Option<&str> {
        self.json().get("model")?.as_str()
    }

    /// Token usage metadata.
    fn usage(&self) -> Option<&Value> {
        self.json().get("usage")
    }
}

macro_rules! response_object {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            payload: Value,
        }

        impl FoundationModelObject for $name {
            fn from_json(payload: Value) -> Self {
                Self { payload }
            }

            fn json(&self) -> &Value {
                &self.payload
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let pretty = serde_json::to_string_pretty(&self.payload)
                    .map_err(|_| std::fmt::Error)?;
                f.write_str(&pretty)
            }
        }
    };
}

response_object! {
    /// One complete chat completion response.
    ChatCompletionResponse
}

response_object! {
    /// One incremental unit of a streamed chat completion.
    ChatCompletionChunk
}

response_object! {
    /// One complete text completion response.
    CompletionResponse
}

response_object! {
    /// One incremental unit of a streamed text completion.
    CompletionChunk
}

response_object! {
    /// One complete embedding response.
    EmbeddingResponse
}

impl ChatCompletionResponse {
    /// Content of the first choice's message.
    pub fn message(&self) -> Option<&str> {
        self.payload
            .get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?
            .as_str()
    }
}

impl ChatCompletionChunk {
    /// Content delta of the first choice.
    pub fn message(&self) -> Option<&str> {
        self.payload
            .get("choices")?
            .get(0)?
            .get("delta")?
            .get("content")?
            .as_str()
    }
}

impl CompletionResponse {
    /// Text of every returned choice, in order.
    pub fn text(&self) -> Vec<&str> {
        collect_choice_text(&self.payload)
    }
}

impl CompletionChunk {
    /// Text delta of every returned choice, in order.
    pub fn text(&self) -> Vec<&str> {
        collect_choice_text(&self.payload)
    }
}

impl EmbeddingResponse {
    /// Embedding vector of every data entry, in order.
    pub fn embeddings(&self) -> Vec<Vec<f64>> {
        self.payload
            .get("data")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("embedding")?.as_array())
                    .map(|vector| vector.iter().filter_map(Value::as_f64).collect())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn collect_choice_text(payload: &Value) -> Vec<&str> {
    payload
        .get("choices")
        .and_then(Value::as_array)
        .map(|choices| {
            choices
                .iter()
                .filter_map(|choice| choice.get("text")?.as_str())
                .collect()
        })
        .unwrap_or_default()
}
