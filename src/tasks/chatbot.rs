use tokio::sync::mpsc;
use tracing::instrument;

use crate::{notifications::Notification, Agent, AgentBuildError, AgentBuilder, AgentError};

const SYSTEM_PROMPT: &str = "You are a highly knowledgeable, careful, and ethical medical assistant. \
Always provide evidence-based, up-to-date, and safe advice. \
If you are unsure, say so and recommend consulting a healthcare professional. \
Cite guidelines or reputable sources when possible.";

/// Single-turn medical assistant.
#[derive(Debug, Clone)]
pub struct ChatbotAgent {
    agent: Agent,
}

impl ChatbotAgent {
    pub const NAME: &'static str = "ChatbotAgent";

    pub fn new(builder: AgentBuilder) -> Result<Self, AgentBuildError> {
        let agent = builder
            .set_name(Self::NAME)
            .set_system_prompt(SYSTEM_PROMPT)
            .build()?;
        Ok(Self { agent })
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Token notifications are only emitted when the agent was built with streaming on.
    pub fn subscribe(&mut self) -> mpsc::Receiver<Notification> {
        self.agent.new_notification_channel()
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn execute(&self, user_input: &str) -> Result<String, AgentError> {
        self.agent.prompt(user_input).await
    }
}
