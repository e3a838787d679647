use crate::{feedback::FeedbackStoreError, AgentBuildError, AgentError};

#[derive(Debug)]
pub enum HubError {
    /// No agent is registered under this name.
    UnknownAgent(String),
    /// The task agent failed to produce an output.
    Generation(AgentError),
    /// The validator failed to produce a report.
    Validation(AgentError),
    Build(AgentBuildError),
    Feedback(FeedbackStoreError),
    /// Human ratings must lie in 1.0..=5.0.
    InvalidRating(f64),
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubError::UnknownAgent(name) => write!(f, "Agent '{name}' not found."),
            HubError::Generation(e) => write!(f, "Generation failed: {e}"),
            HubError::Validation(e) => write!(f, "Validation failed: {e}"),
            HubError::Build(e) => write!(f, "Could not build agent: {e}"),
            HubError::Feedback(e) => write!(f, "{e}"),
            HubError::InvalidRating(r) => {
                write!(f, "Rating {r} is out of range, expected 1.0 to 5.0")
            }
        }
    }
}

impl std::error::Error for HubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HubError::Generation(e) | HubError::Validation(e) => Some(e),
            HubError::Build(e) => Some(e),
            HubError::Feedback(e) => Some(e),
            HubError::UnknownAgent(_) | HubError::InvalidRating(_) => None,
        }
    }
}

impl From<AgentBuildError> for HubError {
    fn from(err: AgentBuildError) -> Self {
        HubError::Build(err)
    }
}

impl From<FeedbackStoreError> for HubError {
    fn from(err: FeedbackStoreError) -> Self {
        HubError::Feedback(err)
    }
}
