use std::fmt;

use crate::hub::{AgentManager, HubError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => f.write_str("🧑‍💻 You"),
            Speaker::Assistant => f.write_str("🤖 AI"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub message: String,
}

impl fmt::Display for ChatTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker, self.message)
    }
}

/// Displayed chat history. The model itself only ever sees the latest
/// question; the history is for the user.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Ask the chatbot. Both turns are recorded only when the model answers.
    pub async fn ask(&mut self, manager: &AgentManager, input: &str) -> Result<String, HubError> {
        let reply = manager.chat(input).await?;
        self.turns.push(ChatTurn {
            speaker: Speaker::User,
            message: input.to_string(),
        });
        self.turns.push(ChatTurn {
            speaker: Speaker::Assistant,
            message: reply.clone(),
        });
        Ok(reply)
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::HubConfig, NotificationContent};
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn ask_records_both_turns_and_clear_resets() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.2:3b",
                "message": { "role": "assistant", "content": " Rest and fluids. " },
                "done": true
            })))
            .mount(&server)
            .await;

        let manager = AgentManager::new(HubConfig {
            ollama_host: server.uri(),
            ..Default::default()
        })
        .unwrap();
        let mut session = ChatSession::new();

        let reply = session.ask(&manager, "How to treat a cold?").await.unwrap();
        assert_eq!(reply, "Rest and fluids.");
        assert_eq!(
            session.transcript(),
            "🧑‍💻 You: How to treat a cold?\n🤖 AI: Rest and fluids."
        );

        session.clear();
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn failed_question_leaves_history_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let manager = AgentManager::new(HubConfig {
            ollama_host: server.uri(),
            max_retries: 1,
            ..Default::default()
        })
        .unwrap();
        let mut session = ChatSession::new();

        assert!(session.ask(&manager, "hello").await.is_err());
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn streamed_chat_emits_tokens() {
        let server = MockServer::start().await;
        let body = [
            json!({"model": "m", "message": {"role": "assistant", "content": "Drink "}, "done": false}),
            json!({"model": "m", "message": {"role": "assistant", "content": "water."}, "done": false}),
            json!({"model": "m", "message": {"role": "assistant", "content": ""}, "done": true}),
        ]
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("\n");
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let mut manager = AgentManager::new(HubConfig {
            ollama_host: server.uri(),
            stream_chat: true,
            ..Default::default()
        })
        .unwrap();
        let mut rx = manager.chat_notifications();

        let reply = ChatSession::new().ask(&manager, "thirsty").await.unwrap();
        assert_eq!(reply, "Drink water.");

        let mut tokens = String::new();
        while let Ok(n) = rx.try_recv() {
            if let NotificationContent::Token(t) = n.content {
                tokens.push_str(&t.value);
            }
        }
        assert_eq!(tokens, "Drink water.");
    }
}
