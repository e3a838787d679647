use crate::services::llm::InferenceClientError;

/// Errors that can occur while running an [`Agent`](crate::Agent).
#[derive(Debug)]
pub enum AgentError {
    /// Failure inside the underlying LLM client.
    ModelClient(InferenceClientError),
    /// The model answered, but with nothing but whitespace.
    EmptyResponse,
    /// Every attempt failed; carries the error of the last one.
    RetriesExhausted {
        agent: String,
        retries: usize,
        last_error: Box<AgentError>,
    },
    /// A runtime failure (e.g. missing data, unexpected state).
    Runtime(String),
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentError::ModelClient(e) => write!(f, "Model client error: {e}"),
            AgentError::EmptyResponse => write!(f, "Received empty response from Ollama."),
            AgentError::RetriesExhausted {
                agent,
                retries,
                last_error,
            } => write!(
                f,
                "[{agent}] Failed to get response from Ollama after {retries} retries: {last_error}"
            ),
            AgentError::Runtime(s) => write!(f, "Runtime error: {s}"),
        }
    }
}

impl std::error::Error for AgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AgentError::ModelClient(e) => Some(e),
            AgentError::RetriesExhausted { last_error, .. } => Some(last_error.as_ref()),
            AgentError::EmptyResponse | AgentError::Runtime(_) => None,
        }
    }
}

impl From<InferenceClientError> for AgentError {
    fn from(err: InferenceClientError) -> Self {
        AgentError::ModelClient(err)
    }
}

/// Errors that can occur while building an [`Agent`](crate::Agent).
#[derive(Debug)]
pub enum AgentBuildError {
    /// Failure initializing the underlying model client.
    ModelClient(InferenceClientError),
    /// Required model was not set on the builder.
    ModelNotSet,
}

impl std::fmt::Display for AgentBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentBuildError::ModelNotSet => write!(f, "Model not set."),
            AgentBuildError::ModelClient(e) => write!(f, "ModelClient error: {e}"),
        }
    }
}

impl std::error::Error for AgentBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AgentBuildError::ModelClient(e) => Some(e),
            AgentBuildError::ModelNotSet => None,
        }
    }
}

impl From<InferenceClientError> for AgentBuildError {
    fn from(err: InferenceClientError) -> Self {
        AgentBuildError::ModelClient(err)
    }
}
