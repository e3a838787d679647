use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde::de::DeserializeOwned;
use std::{fmt, pin::Pin};
use tracing::{debug, error, span, Instrument, Level};

use crate::services::llm::models::{
    chat::{ChatRequest, ChatResponse, ChatStreamChunk},
    errors::InferenceClientError,
};
use crate::services::llm::ClientConfig;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    pub client: Client,
    pub base_url: String,
}

impl OllamaClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self, InferenceClientError> {
        let mut headers = HeaderMap::new();
        if let Some(extra) = &cfg.extra_headers {
            for (key, value) in extra {
                let name = HeaderName::from_bytes(key.as_bytes())
                    .map_err(|e| InferenceClientError::Config(format!("header `{key}`: {e}")))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| InferenceClientError::Config(format!("header `{key}`: {e}")))?;
                headers.insert(name, value);
            }
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| InferenceClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: cfg.resolved_base_url(),
        })
    }

    async fn post<T, R>(&self, endpoint: &str, request_body: &T) -> Result<R, InferenceClientError>
    where
        T: serde::Serialize + fmt::Debug,
        R: DeserializeOwned + fmt::Debug,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let span = span!(Level::DEBUG, "ollama_request", method = "POST", url = url.as_str());

        async {
            let response = self
                .client
                .post(&url)
                .json(request_body)
                .send()
                .await
                .map_err(|e| InferenceClientError::Request(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error body".into());

                error!(%status, body = %error_text, "request failed");
                return Err(InferenceClientError::Api(format!(
                    "Ollama request failed: {status} - {error_text}"
                )));
            }

            let response_text = response.text().await.map_err(|e| {
                InferenceClientError::Api(format!("Failed to read response text: {e}"))
            })?;
            debug!(bytes = response_text.len(), "response received");

            serde_json::from_str::<R>(&response_text).map_err(|e| {
                error!(%e, raw = %response_text, "deserialization error");
                InferenceClientError::Serialization(format!(
                    "Error decoding response body: {e}. Raw JSON was: '{response_text}'"
                ))
            })
        }
        .instrument(span)
        .await
    }

    async fn post_stream<T, R>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<
        Pin<Box<dyn Stream<Item = Result<R, InferenceClientError>> + Send + 'static>>,
        InferenceClientError,
    >
    where
        T: serde::Serialize + fmt::Debug,
        R: DeserializeOwned + fmt::Debug + Send + 'static,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let span = span!(Level::DEBUG, "ollama_stream", method = "POST", url = url.as_str());

        let resp = async {
            let resp = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| InferenceClientError::Request(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                let error_text = resp.text().await.unwrap_or_default();
                error!(%status, body = %error_text, "stream request failed");
                return Err(InferenceClientError::Api(format!(
                    "Ollama request failed: {status} - {error_text}"
                )));
            }
            Ok(resp)
        }
        .instrument(span)
        .await?;

        let byte_stream = resp.bytes_stream();

        let s = try_stream! {
            let mut buf = Vec::<u8>::new();
            futures::pin_mut!(byte_stream);

            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk.map_err(|e| InferenceClientError::Request(e.to_string()))?;
                buf.extend_from_slice(&chunk);

                while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buf.drain(..=pos).collect();
                    let line = line[..line.len() - 1].trim_ascii();
                    if line.is_empty() {
                        continue;
                    }
                    let parsed = serde_json::from_slice::<R>(line)
                        .map_err(|e| InferenceClientError::Serialization(e.to_string()))?;
                    yield parsed;
                }
            }

            // the last line is not always newline terminated
            let rest = buf.trim_ascii();
            if !rest.is_empty() {
                let parsed = serde_json::from_slice::<R>(rest)
                    .map_err(|e| InferenceClientError::Serialization(e.to_string()))?;
                yield parsed;
            }
        };

        Ok(Box::pin(s))
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, InferenceClientError> {
        let mut request = request;
        request.base.stream = Some(false);
        self.post("/api/chat", &request).await
    }

    pub async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<
        Pin<Box<dyn Stream<Item = Result<ChatStreamChunk, InferenceClientError>> + Send + 'static>>,
        InferenceClientError,
    > {
        let mut request = request;
        request.base.stream = Some(true);
        self.post_stream("/api/chat", &request).await
    }
}
