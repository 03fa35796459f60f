//! One request/response cycle: endpoint resolution, header and body
//! construction, the retry-wrapped transport call, and response decoding.

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::endpoint::{build_url, resolve_endpoint};
use crate::request::{ModelRequest, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use crate::response::FoundationModelObject;
use crate::retry::RetryPolicy;
use crate::transport;
use crate::{Error, Result};

use super::stream::{AsyncResponseStream, ResponseStream};
use super::FoundationModelClient;

pub(crate) struct Prepared {
    url: String,
    headers: HeaderMap,
    body: Value,
    timeout: u64,
    max_retries: u32,
}

impl FoundationModelClient {
    fn prepare<R: ModelRequest>(&self, request: &R) -> Result<Prepared> {
        let endpoint = resolve_endpoint(request.model(), R::SUPPORTED_MODELS);
        let url = build_url(self.overrides(), self.workspace().host(), &endpoint);
        let headers = transport::build_headers(&self.workspace().authenticate())?;
        let body = request.body()?;
        tracing::debug!(%url, %endpoint, "dispatching model request");
        Ok(Prepared {
            url,
            headers,
            body,
            timeout: request.timeout().unwrap_or(DEFAULT_TIMEOUT_SECS),
            max_retries: request.max_retries().unwrap_or(DEFAULT_MAX_RETRIES),
        })
    }

    /// A buffered call must not carry `stream=true`; the streaming
    /// variants exist for that.
    fn ensure_buffered<R: ModelRequest>(request: &R) -> Result<()> {
        if request.stream() {
            Err(Error::Validation(
                "stream=true requires the streaming variant of this operation".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn mark_streaming(prepared: &mut Prepared) {
        if let Some(map) = prepared.body.as_object_mut() {
            map.insert("stream".to_string(), Value::Bool(true));
        }
    }

    pub(crate) fn execute_buffered<R, O>(&self, request: &R) -> Result<O>
    where
        R: ModelRequest,
        O: FoundationModelObject,
    {
        Self::ensure_buffered(request)?;
        let prepared = self.prepare(request)?;
        let policy = RetryPolicy::bounded(prepared.max_retries, prepared.timeout);
        let response = policy
            .run(|| {
                transport::send(
                    self.http_client(),
                    &prepared.url,
                    &prepared.headers,
                    &prepared.body,
                    prepared.timeout,
                )
            })
            .map_err(|e| transport::classify(e, prepared.timeout))?;
        decode_buffered(response, &prepared.url)
    }

    pub(crate) async fn execute_buffered_async<R, O>(&self, request: &R) -> Result<O>
    where
        R: ModelRequest,
        O: FoundationModelObject,
    {
        Self::ensure_buffered(request)?;
        let prepared = self.prepare(request)?;
        let policy = RetryPolicy::bounded(prepared.max_retries, prepared.timeout);
        let response = policy
            .run_async(|| {
                transport::send_async(
                    self.async_http_client(),
                    &prepared.url,
                    &prepared.headers,
                    &prepared.body,
                    prepared.timeout,
                )
            })
            .await
            .map_err(|e| transport::classify(e, prepared.timeout))?;
        decode_buffered_async(response, &prepared.url).await
    }

    pub(crate) fn execute_streaming<R, O>(&self, request: &R) -> Result<ResponseStream<O>>
    where
        R: ModelRequest,
        O: FoundationModelObject,
    {
        let mut prepared = self.prepare(request)?;
        Self::mark_streaming(&mut prepared);
        let policy = RetryPolicy::bounded(prepared.max_retries, prepared.timeout);
        let response = policy
            .run(|| {
                transport::send(
                    self.http_client(),
                    &prepared.url,
                    &prepared.headers,
                    &prepared.body,
                    prepared.timeout,
                )
            })
            .map_err(|e| transport::classify(e, prepared.timeout))?;
        let status = response.status().as_u16();
        if status >= 400 {
            let text = response.text().unwrap_or_default();
            return Err(Error::from_response(status, &text, &prepared.url));
        }
        Ok(ResponseStream::new(prepared.url, response))
    }

    pub(crate) async fn execute_streaming_async<R, O>(
        &self,
        request: &R,
    ) -> Result<AsyncResponseStream<O>>
    where
        R: ModelRequest,
        O: FoundationModelObject,
    {
        let mut prepared = self.prepare(request)?;
        Self::mark_streaming(&mut prepared);
        let policy = RetryPolicy::bounded(prepared.max_retries, prepared.timeout);
        let response = policy
            .run_async(|| {
                transport::send_async(
                    self.async_http_client(),
                    &prepared.url,
                    &prepared.headers,
                    &prepared.body,
                    prepared.timeout,
                )
            })
            .await
            .map_err(|e| transport::classify(e, prepared.timeout))?;
        let status = response.status().as_u16();
        if status >= 400 {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::from_response(status, &text, &prepared.url));
        }
        Ok(AsyncResponseStream::new(prepared.url, response))
    }
}

fn decode_buffered<O: FoundationModelObject>(
    response: reqwest::blocking::Response,
    url: &str,
) -> Result<O> {
    let status = response.status().as_u16();
    let text = response.text().map_err(|e| Error::Connection(e.to_string()))?;
    decode_body(status, &text, url)
}

async fn decode_buffered_async<O: FoundationModelObject>(
    response: reqwest::Response,
    url: &str,
) -> Result<O> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| Error::Connection(e.to_string()))?;
    decode_body(status, &text, url)
}

fn decode_body<O: FoundationModelObject>(status: u16, text: &str, url: &str) -> Result<O> {
    if status < 400 {
        let value: Value = serde_json::from_str(text).map_err(|e| Error::Decode {
            url: Some(url.to_string()),
            message: e.to_string(),
        })?;
        Ok(O::from_json(value))
    } else {
        Err(Error::from_response(status, text, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ChatCompletionResponse;

    #[test]
    fn success_body_decodes_into_response_object() {
        let response: ChatCompletionResponse =
            decode_body(200, r#"{"id": "x"}"#, "http://u").unwrap();
        assert_eq!(response.id(), Some("x"));
    }

    #[test]
    fn invalid_success_body_is_a_decode_error() {
        let err = decode_body::<ChatCompletionResponse>(200, "not json", "http://u").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert_eq!(err.url(), Some("http://u"));
    }

    #[test]
    fn failure_body_becomes_a_server_error() {
        let err =
            decode_body::<ChatCompletionResponse>(429, "too many requests", "http://u").unwrap_err();
        assert_eq!(err.status(), Some(429));
    }
}
