use tracing::instrument;

use crate::{templates::Template, Agent, AgentBuildError, AgentBuilder, AgentError};

const SYSTEM_PROMPT: &str =
    "You are an AI assistant that summarizes medical texts concisely and accurately.";
const USER_PROMPT: &str = "Summarize the following medical text concisely:\n\n{{text}}\n\nSummary:";

/// Produces a concise summary of a medical text.
#[derive(Debug, Clone)]
pub struct SummarizeTool {
    agent: Agent,
    template: Template,
}

impl SummarizeTool {
    pub const NAME: &'static str = "SummarizeTool";
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 300;

    /// `builder` carries the shared model and client settings.
    pub fn new(builder: AgentBuilder) -> Result<Self, AgentBuildError> {
        let agent = builder
            .set_name(Self::NAME)
            .set_system_prompt(SYSTEM_PROMPT)
            .set_temperature(Self::TEMPERATURE)
            .set_max_tokens(Self::MAX_TOKENS)
            .build()?;
        Ok(Self {
            agent,
            template: Template::simple(USER_PROMPT),
        })
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn execute(&self, text: &str) -> Result<String, AgentError> {
        let prompt = self.template.render([("text", text)]);
        self.agent.prompt(prompt).await
    }
}
