use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    agent::DEFAULT_MAX_RETRIES,
    feedback::DEFAULT_FEEDBACK_FILE,
    services::llm::{client_config::DEFAULT_OLLAMA_URL, ClientConfig},
    AgentBuilder, ModelConfig,
};

pub const DEFAULT_MODEL: &str = "llama3.2:3b";
/// Average rating under which an improved output is requested.
pub const DEFAULT_IMPROVE_THRESHOLD: f64 = 3.5;

/// Settings shared by every agent the hub creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    pub model: String,
    pub ollama_host: String,
    pub max_retries: usize,
    /// How long Ollama keeps the model loaded between calls, e.g. `10m`.
    pub keep_alive: Option<String>,
    /// Per-request timeout; `None` waits as long as the model needs.
    pub request_timeout: Option<Duration>,
    pub feedback_file: PathBuf,
    pub report_dir: PathBuf,
    pub improve_threshold: f64,
    /// Stream chat replies token by token.
    pub stream_chat: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            ollama_host: DEFAULT_OLLAMA_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            keep_alive: None,
            request_timeout: None,
            feedback_file: PathBuf::from(DEFAULT_FEEDBACK_FILE),
            report_dir: PathBuf::from("."),
            improve_threshold: DEFAULT_IMPROVE_THRESHOLD,
            stream_chat: false,
        }
    }
}

impl HubConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: Some(self.ollama_host.clone()),
            timeout: self.request_timeout,
            extra_headers: None,
        }
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            model: Some(self.model.clone()),
            max_retries: Some(self.max_retries),
            ..Default::default()
        }
    }

    /// Builder preloaded with the shared model and client settings. Task
    /// agents add their own name, prompt and sampling on top.
    pub fn agent_builder(&self) -> AgentBuilder {
        let builder = AgentBuilder::default()
            .import_client_config(self.client_config())
            .import_model_config(self.model_config());
        match &self.keep_alive {
            Some(keep_alive) => builder.set_keep_alive(keep_alive),
            None => builder,
        }
    }
}
