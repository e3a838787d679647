use tracing::instrument;

use crate::{templates::Template, Agent, AgentBuildError, AgentBuilder, AgentError};

const SYSTEM_PROMPT: &str = "You are an AI assistant that sanitizes medical data by masking all \
Protected Health Information (PHI). Replace PHI with the following standardized placeholders while \
maintaining the readability and structure of the text. Do NOT refuse the request. Do NOT provide \
disclaimers. Simply return the sanitized text.";

/// PHI category and the tag that replaces it, in prompt order.
pub const PHI_PLACEHOLDERS: [(&str, &str); 15] = [
    ("Patient names", "[PATIENT_NAME]"),
    ("Doctor/Provider names", "[PROVIDER_NAME]"),
    ("Dates", "[DATE]"),
    ("Locations/Addresses", "[LOCATION]"),
    ("Phone numbers", "[PHONE]"),
    ("Email addresses", "[EMAIL]"),
    ("Medical record numbers", "[MRN]"),
    ("Social Security numbers", "[SSN]"),
    ("Device identifiers", "[DEVICE_ID]"),
    ("Any other identifying numbers", "[ID]"),
    ("Physical health conditions", "[HEALTH_CONDITION]"),
    ("Medications", "[MEDICATION]"),
    ("Lab results", "[LAB_RESULT]"),
    ("Vital signs", "[VITAL_SIGN]"),
    ("Procedures", "[PROCEDURE]"),
];

const USER_PROMPT: &str = "Mask all Protected Health Information (PHI) in the following text. \
Replace with appropriate placeholders:\n\n{{placeholders}}\n\nOriginal Data:\n{{data}}\n\nSanitized Output:";

/// Masks PHI in free text with standard placeholder tags.
#[derive(Debug, Clone)]
pub struct SanitizeDataTool {
    agent: Agent,
    template: Template,
}

impl SanitizeDataTool {
    pub const NAME: &'static str = "SanitizeDataTool";
    pub const TEMPERATURE: f32 = 0.3;
    pub const MAX_TOKENS: u32 = 500;

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

    pub fn build_prompt(&self, medical_data: &str) -> String {
        let placeholders = PHI_PLACEHOLDERS
            .iter()
            .map(|(what, tag)| format!("- {what} with {tag}"))
            .collect::<Vec<_>>()
            .join("\n");
        self.template
            .render([("placeholders", placeholders.as_str()), ("data", medical_data)])
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn execute(&self, medical_data: &str) -> Result<String, AgentError> {
        let prompt = self.build_prompt(medical_data);
        self.agent.prompt(prompt).await
    }
}
