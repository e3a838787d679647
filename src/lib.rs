pub(crate) mod services;
pub mod agent;
pub mod config;
pub mod feedback;
pub mod hub;
pub mod keywords;
pub mod notifications;
pub mod reports;
pub mod tasks;
pub mod templates;
pub mod validation;

pub use agent::*;

pub use config::HubConfig;
pub use hub::{AgentManager, AgentName, ChatSession, HubError, RatingOutcome, TaskRun};
pub use notifications::{Notification, NotificationContent};
pub use services::llm::models::base::{Message, Role};
pub use services::llm::client_config::DEFAULT_OLLAMA_URL;
pub use services::llm::{ChatRequest, ChatResponse, ClientBuilder, ClientConfig, InferenceClientError};
pub use services::logging::{init_default_tracing, init_tracing};
pub use tasks::TaskKind;
