use std::{fmt, str::FromStr};

use crate::hub::HubError;

/// Every agent the hub registers, addressable by its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentName {
    Summarize,
    WriteArticle,
    SanitizeData,
    SummarizeValidator,
    WriteArticleValidator,
    SanitizeDataValidator,
    Chatbot,
}

impl AgentName {
    pub const ALL: [AgentName; 7] = [
        AgentName::Summarize,
        AgentName::WriteArticle,
        AgentName::SanitizeData,
        AgentName::SummarizeValidator,
        AgentName::WriteArticleValidator,
        AgentName::SanitizeDataValidator,
        AgentName::Chatbot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentName::Summarize => "summarize",
            AgentName::WriteArticle => "write_article",
            AgentName::SanitizeData => "sanitize_data",
            AgentName::SummarizeValidator => "summarize_validator",
            AgentName::WriteArticleValidator => "write_article_validator",
            AgentName::SanitizeDataValidator => "sanitize_data_validator",
            AgentName::Chatbot => "chatbot",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AgentName::Summarize => "Summarizes medical texts",
            AgentName::WriteArticle => "Writes and refines research articles",
            AgentName::SanitizeData => "Masks protected health information",
            AgentName::SummarizeValidator => "Rates summaries against their source",
            AgentName::WriteArticleValidator => "Rates research articles",
            AgentName::SanitizeDataValidator => "Checks that PHI was masked",
            AgentName::Chatbot => "Answers open medical questions",
        }
    }
}

impl FromStr for AgentName {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| HubError::UnknownAgent(s.to_string()))
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
