use std::{pin::Pin, sync::Arc};

use futures::Stream;

use crate::services::llm::{
    models::{
        chat::{ChatRequest, ChatResponse, ChatStreamChunk},
        errors::InferenceClientError,
    },
    providers::OllamaClient,
    ClientConfig,
};

pub type ChatStream =
    Pin<Box<dyn Stream<Item = Result<ChatStreamChunk, InferenceClientError>> + Send + 'static>>;

/// Cheaply clonable handle to the model server.
#[derive(Clone, Debug)]
pub struct InferenceClient {
    config: ClientConfig,
    inner: Arc<OllamaClient>,
}

impl InferenceClient {
    pub fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, InferenceClientError> {
        self.inner.chat(req).await
    }

    pub async fn chat_stream(&self, req: ChatRequest) -> Result<ChatStream, InferenceClientError> {
        self.inner.chat_stream(req).await
    }
}

impl TryFrom<ClientConfig> for InferenceClient {
    type Error = InferenceClientError;

    fn try_from(cfg: ClientConfig) -> Result<Self, Self::Error> {
        let inner = OllamaClient::new(&cfg)?;
        Ok(Self {
            config: cfg,
            inner: Arc::new(inner),
        })
    }
}
