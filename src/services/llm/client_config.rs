use std::{collections::HashMap, time::Duration};

use crate::services::llm::{InferenceClient, InferenceClientError};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientConfig {
    /// Ollama server address. `host:port` without a scheme is accepted.
    pub base_url: Option<String>,
    /// Per-request timeout; unset means wait for the model indefinitely.
    pub timeout: Option<Duration>,
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ClientConfig {
    /// The base URL with a scheme and without a trailing slash.
    pub fn resolved_base_url(&self) -> String {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_OLLAMA_URL);

        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };
        with_scheme.trim_end_matches('/').to_string()
    }
}

pub trait ClientBuilder {
    fn base_url(self, base_url: Option<impl Into<String>>) -> Self;
    fn timeout(self, timeout: Option<Duration>) -> Self;
    fn extra_headers(self, extra_headers: Option<HashMap<String, String>>) -> Self;
    fn build(self) -> Result<InferenceClient, InferenceClientError>;
}

impl ClientBuilder for ClientConfig {
    fn base_url(mut self, base_url: Option<impl Into<String>>) -> Self {
        self.base_url = base_url.map(|s| s.into());
        self
    }

    fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn extra_headers(mut self, extra_headers: Option<HashMap<String, String>>) -> Self {
        self.extra_headers = extra_headers;
        self
    }

    fn build(self) -> Result<InferenceClient, InferenceClientError> {
        InferenceClient::try_from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_defaults_to_local_ollama() {
        assert_eq!(ClientConfig::default().resolved_base_url(), DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn bare_host_gets_scheme_and_loses_trailing_slash() {
        let cfg = ClientConfig::default().base_url(Some("127.0.0.1:11434/"));
        assert_eq!(cfg.resolved_base_url(), "http://127.0.0.1:11434");

        let cfg = ClientConfig::default().base_url(Some("https://gpu-box:8443"));
        assert_eq!(cfg.resolved_base_url(), "https://gpu-box:8443");
    }

    #[test]
    fn invalid_header_is_a_config_error() {
        let mut headers = HashMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        let err = ClientConfig::default()
            .extra_headers(Some(headers))
            .build()
            .unwrap_err();
        assert!(matches!(err, InferenceClientError::Config(_)));
    }
}
