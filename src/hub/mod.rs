mod chat;
mod error;
mod manager;
mod names;

pub use self::{
    chat::{ChatSession, ChatTurn, Speaker},
    error::HubError,
    manager::{parse_rating, AgentManager, RatingOutcome, TaskRun},
    names::AgentName,
};
