use std::{collections::HashMap, time::Duration};

use tokio::sync::mpsc;

use crate::{
    agent::models::{configs::ModelConfig, error::AgentBuildError},
    notifications::Notification,
    services::llm::ClientConfig,
    Agent,
};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// A builder for [`Agent`].
///
/// Example:
///
/// ```
/// use healthcare_hub::AgentBuilder;
///
/// let agent = AgentBuilder::default()
///     // model must be set, everything else has
///     // defaults and is optional
///     .set_model("llama3.2:3b")
///     .set_system_prompt("You are a helpful assistant.")
///     .set_temperature(0.3)
///     .set_max_tokens(500)
///     .build();
/// assert!(agent.is_ok());
/// ```
#[derive(Debug, Default, Clone)]
pub struct AgentBuilder {
    /// Name used for logging and notifications
    name: Option<String>,
    /// Model identifier passed to Ollama
    model: Option<String>,

    /// Optional base URL of the Ollama server
    base_url: Option<String>,
    /// Per-request timeout
    timeout: Option<Duration>,
    /// Extra HTTP headers appended to every request
    extra_headers: Option<HashMap<String, String>>,

    /// System prompt used by `Agent::prompt`
    system_prompt: Option<String>,
    /// Sampling temperature
    temperature: Option<f32>,
    /// Max tokens to predict
    max_tokens: Option<u32>,
    /// Attempts per call
    max_retries: Option<usize>,
    /// How long Ollama keeps the model loaded
    keep_alive: Option<String>,
    /// Enable server streaming for token events
    stream: Option<bool>,

    /// Optional mpsc sender for notifications
    notification_channel: Option<mpsc::Sender<Notification>>,
}

impl AgentBuilder {
    /// Import client settings. Only fields present in `conf` are applied.
    pub fn import_client_config(mut self, conf: ClientConfig) -> Self {
        if let Some(base_url) = conf.base_url {
            self = self.set_ollama_endpoint(base_url);
        }
        if let Some(timeout) = conf.timeout {
            self = self.set_timeout(timeout);
        }
        if let Some(extra_headers) = conf.extra_headers {
            self = self.set_extra_headers(extra_headers);
        }
        self
    }

    /// Import model parameters. Only fields present in `conf` are applied.
    pub fn import_model_config(mut self, conf: ModelConfig) -> Self {
        if let Some(model) = conf.model {
            self = self.set_model(model);
        }
        if let Some(temperature) = conf.temperature {
            self = self.set_temperature(temperature);
        }
        if let Some(max_tokens) = conf.max_tokens {
            self = self.set_max_tokens(max_tokens);
        }
        if let Some(max_retries) = conf.max_retries {
            self = self.set_max_retries(max_retries);
        }
        self
    }

    pub fn set_name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_model<T: Into<String>>(mut self, model: T) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Address of the Ollama server, e.g. `http://localhost:11434`.
    pub fn set_ollama_endpoint<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn set_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn set_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    pub fn set_system_prompt<T: Into<String>>(mut self, prompt: T) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn set_temperature(mut self, v: f32) -> Self {
        self.temperature = Some(v);
        self
    }

    pub fn set_max_tokens(mut self, v: u32) -> Self {
        self.max_tokens = Some(v);
        self
    }

    pub fn set_max_retries(mut self, v: usize) -> Self {
        self.max_retries = Some(v);
        self
    }

    pub fn set_keep_alive<T: Into<String>>(mut self, v: T) -> Self {
        self.keep_alive = Some(v.into());
        self
    }

    pub fn set_stream(mut self, v: bool) -> Self {
        self.stream = Some(v);
        self
    }

    pub fn set_notification_channel(mut self, channel: mpsc::Sender<Notification>) -> Self {
        self.notification_channel = Some(channel);
        self
    }

    /// Build the agent and a fresh notification receiver wired to it.
    pub fn build_with_notification(
        self,
    ) -> Result<(Agent, mpsc::Receiver<Notification>), AgentBuildError> {
        let (sender, receiver) = mpsc::channel(100);
        let agent = self.set_notification_channel(sender).build()?;
        Ok((agent, receiver))
    }

    /// Build the [`Agent`]. Fails if no model was set or the client cannot be created.
    pub fn build(self) -> Result<Agent, AgentBuildError> {
        let Some(model) = self.model else {
            return Err(AgentBuildError::ModelNotSet);
        };

        let name = self.name.unwrap_or_else(|| format!("Agent ({model})"));
        let client_config = ClientConfig {
            base_url: self.base_url,
            timeout: self.timeout,
            extra_headers: self.extra_headers,
        };

        Agent::try_new(
            name,
            model,
            client_config,
            self.system_prompt,
            self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            self.keep_alive,
            self.stream.unwrap_or(false),
            self.notification_channel,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_model() {
        let err = AgentBuilder::default().set_name("x").build().unwrap_err();
        assert!(matches!(err, AgentBuildError::ModelNotSet));
    }

    #[test]
    fn defaults_are_applied() {
        let agent = AgentBuilder::default().set_model("llama3.2:3b").build().unwrap();
        assert_eq!(agent.name, "Agent (llama3.2:3b)");
        assert_eq!(agent.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(agent.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(agent.max_retries, DEFAULT_MAX_RETRIES);
        assert!(!agent.stream);
        assert_eq!(agent.export_client_config(), ClientConfig::default());
    }

    #[test]
    fn imported_configs_only_override_present_fields() {
        let agent = AgentBuilder::default()
            .set_temperature(0.3)
            .import_model_config(ModelConfig {
                model: Some("meditron".into()),
                max_tokens: Some(300),
                ..Default::default()
            })
            .import_client_config(ClientConfig {
                base_url: Some("http://gpu:11434".into()),
                ..Default::default()
            })
            .build()
            .unwrap();

        let exported = agent.export_model_config();
        assert_eq!(exported.model.as_deref(), Some("meditron"));
        assert_eq!(exported.temperature, Some(0.3));
        assert_eq!(exported.max_tokens, Some(300));
        assert_eq!(
            agent.export_client_config().base_url.as_deref(),
            Some("http://gpu:11434")
        );
    }
}
