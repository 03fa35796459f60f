//! Endpoint resolution: model identifier -> endpoint name -> URL.

const MODEL_URL_ENV: &str = "DATABRICKS_MODEL_URL";
const HOST_ENV: &str = "DATABRICKS_HOST";

/// Environment-level overrides, captured once at client construction.
///
/// `model_url` short-circuits URL composition entirely (used for test
/// interception); `host` replaces the workspace-supplied host.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub model_url: Option<String>,
    pub host: Option<String>,
}

impl EnvOverrides {
    /// Snapshot `DATABRICKS_MODEL_URL` and `DATABRICKS_HOST`.
    pub fn from_env() -> Self {
        Self {
            model_url: std::env::var(MODEL_URL_ENV).ok(),
            host: std::env::var(HOST_ENV).ok(),
        }
    }

    /// No overrides; the workspace host is used as given.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Map a model identifier to a serving endpoint name.
///
/// Supported pay-per-token models get the `databricks-` alias; anything
/// else is assumed to name a custom serving endpoint and passes through
/// unchanged.
pub fn resolve_endpoint(model: &str, supported_models: &[&str]) -> String {
    if supported_models.contains(&model) {
        format!("databricks-{model}")
    } else {
        model.to_string()
    }
}

/// Compose the invocation URL for an endpoint, honoring overrides.
pub fn build_url(overrides: &EnvOverrides, host: &str, endpoint: &str) -> String {
    if let Some(url) = &overrides.model_url {
        return url.clone();
    }
    let host = overrides.host.as_deref().unwrap_or(host);
    format!("{host}/serving-endpoints/{endpoint}/invocations")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPORTED: &[&str] = &["llama-2-70b-chat", "mixtral-8x7b-instruct", "dbrx-instruct"];

    #[test]
    fn supported_models_get_databricks_alias() {
        for model in SUPPORTED {
            assert_eq!(
                resolve_endpoint(model, SUPPORTED),
                format!("databricks-{model}")
            );
        }
    }

    #[test]
    fn unrecognized_models_pass_through() {
        assert_eq!(resolve_endpoint("my-custom-endpoint", SUPPORTED), "my-custom-endpoint");
        assert_eq!(resolve_endpoint("", SUPPORTED), "");
    }

    #[test]
    fn url_composes_host_and_endpoint() {
        let url = build_url(&EnvOverrides::none(), "https://host", "databricks-dbrx-instruct");
        assert_eq!(
            url,
            "https://host/serving-endpoints/databricks-dbrx-instruct/invocations"
        );
    }

    #[test]
    fn model_url_override_is_used_verbatim() {
        let overrides = EnvOverrides {
            model_url: Some("http://127.0.0.1:9/custom".to_string()),
            host: Some("http://ignored".to_string()),
        };
        assert_eq!(build_url(&overrides, "https://host", "ep"), "http://127.0.0.1:9/custom");
    }

    #[test]
    fn host_override_replaces_workspace_host() {
        let overrides = EnvOverrides {
            model_url: None,
            host: Some("https://other-host".to_string()),
        };
        assert_eq!(
            build_url(&overrides, "https://host", "ep"),
            "https://other-host/serving-endpoints/ep/invocations"
        );
    }
}
