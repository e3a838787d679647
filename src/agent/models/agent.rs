use core::fmt;
use tokio::sync::mpsc::{self, Sender};
use tracing::instrument;

use crate::agent::models::{configs::ModelConfig, error::AgentError};
use crate::agent::util::invoke_with_retries;
use crate::notifications::{Notification, NotificationHandler};
use crate::services::llm::{
    BaseRequest, ChatRequest, ClientConfig, InferenceClient, InferenceOptions, Message,
};

/// A named handle on one model with its own sampling defaults.
///
/// Agents do not keep conversation state: every call sends exactly the
/// messages it is given.
#[derive(Clone)]
pub struct Agent {
    /// Human-readable name of the agent, used in logs and notifications.
    pub name: String,
    /// Underlying model identifier.
    pub model: String,
    /// Prepended to prompts sent through [`Agent::prompt`].
    pub system_prompt: Option<String>,
    /// Sampling temperature used when a call does not override it.
    pub temperature: f32,
    /// Token budget used when a call does not override it.
    pub max_tokens: u32,
    /// Attempts per call. Zero is treated as one.
    pub max_retries: usize,
    /// Keep the model loaded for this long after a call (Ollama duration string).
    pub keep_alive: Option<String>,
    /// Stream tokens from the server and emit them as notifications.
    pub stream: bool,
    /// Notification channel for emitting agent events.
    pub notification_channel: Option<Sender<Notification>>,
    pub(crate) model_client: InferenceClient,
}

impl Agent {
    pub(crate) fn try_new(
        name: String,
        model: String,
        client_config: ClientConfig,
        system_prompt: Option<String>,
        temperature: f32,
        max_tokens: u32,
        max_retries: usize,
        keep_alive: Option<String>,
        stream: bool,
        notification_channel: Option<Sender<Notification>>,
    ) -> Result<Self, crate::AgentBuildError> {
        Ok(Self {
            name,
            model,
            system_prompt,
            temperature,
            max_tokens,
            max_retries,
            keep_alive,
            stream,
            notification_channel,
            model_client: InferenceClient::try_from(client_config)?,
        })
    }

    /// Send `prompt` as a user message, preceded by the system prompt if one is set.
    #[instrument(level = "debug", skip(self, prompt), fields(agent_name = %self.name))]
    pub async fn prompt<T>(&self, prompt: T) -> Result<String, AgentError>
    where
        T: Into<String>,
    {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(Message::system(system.clone()));
        }
        messages.push(Message::user(prompt));
        self.call_model(messages).await
    }

    /// Call the model with the agent's own temperature and token budget.
    pub async fn call_model(&self, messages: Vec<Message>) -> Result<String, AgentError> {
        self.call_model_with(messages, self.temperature, self.max_tokens)
            .await
    }

    /// Call the model, retrying up to `max_retries` times.
    ///
    /// The reply is trimmed; an empty reply counts as a failed attempt.
    #[instrument(level = "debug", skip(self, messages), fields(agent_name = %self.name))]
    pub async fn call_model_with(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, AgentError> {
        let request = self.build_request(messages, temperature, max_tokens);
        invoke_with_retries(self, request).await
    }

    pub fn build_request(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> ChatRequest {
        ChatRequest {
            base: BaseRequest {
                model: self.model.clone(),
                options: Some(InferenceOptions::sampling(temperature, max_tokens)),
                stream: Some(self.stream),
                keep_alive: self.keep_alive.clone(),
            },
            messages,
        }
    }

    /// Replace the notification channel and hand back its receiving end.
    pub fn new_notification_channel(&mut self) -> mpsc::Receiver<Notification> {
        let (s, r) = mpsc::channel::<Notification>(100);
        self.notification_channel = Some(s);
        r
    }

    /// Export current client configuration (base URL, timeout, headers).
    pub fn export_client_config(&self) -> ClientConfig {
        self.model_client.get_config().clone()
    }

    /// Export current model configuration.
    pub fn export_model_config(&self) -> ModelConfig {
        ModelConfig {
            model: Some(self.model.clone()),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            max_retries: Some(self.max_retries),
        }
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("keep_alive", &self.keep_alive)
            .field("stream", &self.stream)
            .field("model_client", &self.model_client)
            .finish()
    }
}

impl NotificationHandler for Agent {
    fn get_outgoing_channel(&self) -> &Option<Sender<Notification>> {
        &self.notification_channel
    }

    fn get_channel_name(&self) -> &String {
        &self.name
    }
}
