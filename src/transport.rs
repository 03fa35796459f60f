//! Thin reqwest helpers shared by both execution models.
//!
//! Callers may supply their own `reqwest` client (blocking or async) to
//! control pooling and TLS; otherwise a lazily-built shared default is
//! used.

use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

use crate::{Error, Result};

/// Identifies this SDK to the serving endpoint.
pub(crate) const SDK_CLIENT_HEADER: &str = "x-databricks-endpoints-api-client";
pub(crate) const SDK_CLIENT_ID: &str = "Generative AI Inference (Mosaic) SDK";

static DEFAULT_BLOCKING_CLIENT: Lazy<reqwest::blocking::Client> =
    Lazy::new(reqwest::blocking::Client::new);
static DEFAULT_ASYNC_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Static headers plus the workspace's auth headers. Auth wins on key
/// collision in both execution models.
pub(crate) fn build_headers(auth_headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(SDK_CLIENT_HEADER),
        HeaderValue::from_static(SDK_CLIENT_ID),
    );
    for (name, value) in auth_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::Validation(format!("invalid auth header name: {name}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::Validation(format!("invalid auth header value for {name}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

pub(crate) fn send(
    client: Option<&reqwest::blocking::Client>,
    url: &str,
    headers: &HeaderMap,
    body: &Value,
    timeout_secs: u64,
) -> reqwest::Result<reqwest::blocking::Response> {
    client
        .unwrap_or(&DEFAULT_BLOCKING_CLIENT)
        .post(url)
        .headers(headers.clone())
        .json(body)
        .timeout(Duration::from_secs(timeout_secs))
        .send()
}

pub(crate) async fn send_async(
    client: Option<&reqwest::Client>,
    url: &str,
    headers: &HeaderMap,
    body: &Value,
    timeout_secs: u64,
) -> reqwest::Result<reqwest::Response> {
    client
        .unwrap_or(&DEFAULT_ASYNC_CLIENT)
        .post(url)
        .headers(headers.clone())
        .json(body)
        .timeout(Duration::from_secs(timeout_secs))
        .send()
        .await
}

/// Map a transport failure to the domain error, naming the configured
/// timeout where the deadline was the cause.
pub(crate) fn classify(err: reqwest::Error, timeout_secs: u64) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            timeout: timeout_secs,
        }
    } else {
        Error::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_content_type_and_sdk_id() {
        let headers = build_headers(&[]).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(SDK_CLIENT_HEADER).unwrap(), SDK_CLIENT_ID);
    }

    #[test]
    fn auth_headers_win_on_collision() {
        let auth = vec![
            ("Authorization".to_string(), "Bearer t".to_string()),
            ("Content-Type".to_string(), "text/plain".to_string()),
        ];
        let headers = build_headers(&auth).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get("Authorization").unwrap(), "Bearer t");
    }

    #[test]
    fn malformed_auth_header_is_a_validation_error() {
        let auth = vec![("bad header".to_string(), "x".to_string())];
        assert!(matches!(
            build_headers(&auth).unwrap_err(),
            Error::Validation(_)
        ));
    }
}
