use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Identifier or name of the model to use.
    pub model: Option<String>,
    /// Sampling temperature (`0.0` = deterministic, higher = more random).
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate in a single response.
    pub max_tokens: Option<u32>,
    /// How many attempts a call gets before the agent gives up.
    pub max_retries: Option<usize>,
}
