use tracing::{info, instrument};

use crate::{
    feedback::{FeedbackEntry, HyperParams, TuningPolicy, ValidationHistory},
    templates::Template,
    Agent, AgentBuildError, AgentBuilder, AgentError, Message,
};

const SYSTEM_PROMPT: &str = "You are an expert academic writer.";
const TOPIC_PROMPT: &str = "Write a research article on the following topic:\nTopic: {{topic}}\n\n";
const OUTLINE_PROMPT: &str = "Outline:\n{{outline}}\n\n";
const ARTICLE_TRAILER: &str = "Article:\n";

/// Drafts or refines a research article, and tunes its own sampling from
/// the human ratings its articles receive.
#[derive(Debug, Clone)]
pub struct WriteArticleTool {
    agent: Agent,
    params: HyperParams,
    policy: TuningPolicy,
    history: ValidationHistory,
}

impl WriteArticleTool {
    pub const NAME: &'static str = "WriteArticleTool";
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 1000;

    pub fn new(builder: AgentBuilder) -> Result<Self, AgentBuildError> {
        let agent = builder
            .set_name(Self::NAME)
            .set_system_prompt(SYSTEM_PROMPT)
            .set_temperature(Self::TEMPERATURE)
            .set_max_tokens(Self::MAX_TOKENS)
            .build()?;
        Ok(Self {
            agent,
            params: HyperParams::new(Self::TEMPERATURE, Self::MAX_TOKENS),
            policy: TuningPolicy::article_writer(),
            history: ValidationHistory::default(),
        })
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn params(&self) -> HyperParams {
        self.params
    }

    pub fn history(&self) -> &ValidationHistory {
        &self.history
    }

    pub fn build_prompt(topic: &str, outline: Option<&str>) -> String {
        let mut prompt = Template::simple(TOPIC_PROMPT).render([("topic", topic)]);
        if let Some(outline) = outline.filter(|o| !o.trim().is_empty()) {
            prompt.push_str(&Template::simple(OUTLINE_PROMPT).render([("outline", outline)]));
        }
        prompt.push_str(ARTICLE_TRAILER);
        prompt
    }

    /// Write an article on `topic`. When refining, `topic` is the draft itself.
    #[instrument(level = "debug", skip_all)]
    pub async fn execute(&self, topic: &str, outline: Option<&str>) -> Result<String, AgentError> {
        let prompt = Self::build_prompt(topic, outline);
        self.agent
            .call_model_with(
                vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
                self.params.temperature,
                self.params.max_tokens,
            )
            .await
    }

    pub fn store_feedback(&mut self, entry: FeedbackEntry) {
        info!(
            agent = Self::NAME,
            ai_rating = entry.ai_rating,
            human_rating = entry.human_rating,
            "Stored feedback"
        );
        self.history.push(entry);
    }

    pub fn preload(&mut self, entries: Vec<FeedbackEntry>) {
        self.history.extend(entries);
    }

    /// Re-tune temperature and token budget; returns whether anything moved.
    pub fn optimize_with_feedback(&mut self) -> bool {
        let changed = self.params.tune(&self.history, &self.policy);
        if changed {
            info!(
                agent = Self::NAME,
                temperature = self.params.temperature,
                max_tokens = self.params.max_tokens,
                "Adjusted settings"
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> WriteArticleTool {
        WriteArticleTool::new(AgentBuilder::default().set_model("llama3.2:3b")).unwrap()
    }

    #[test]
    fn prompt_without_outline() {
        assert_eq!(
            WriteArticleTool::build_prompt("Sepsis in the ICU", None),
            "Write a research article on the following topic:\nTopic: Sepsis in the ICU\n\nArticle:\n"
        );
    }

    #[test]
    fn prompt_with_outline() {
        let prompt = WriteArticleTool::build_prompt("Sepsis", Some("1. Intro\n2. Methods"));
        assert!(prompt.contains("Outline:\n1. Intro\n2. Methods\n\nArticle:\n"));
    }

    #[test]
    fn blank_outline_is_ignored() {
        let prompt = WriteArticleTool::build_prompt("Sepsis", Some("   "));
        assert!(!prompt.contains("Outline:"));
    }

    #[test]
    fn long_articles_grow_the_token_budget_by_a_hundred() {
        let mut tool = tool();
        for _ in 0..5 {
            tool.store_feedback(FeedbackEntry::new("topic", "x".repeat(950), 4, 3.5));
        }
        assert!(tool.optimize_with_feedback());
        assert_eq!(tool.params().max_tokens, 1100);
        assert_eq!(tool.history().len(), 5);
    }

    #[test]
    fn nothing_moves_before_five_ratings() {
        let mut tool = tool();
        for _ in 0..4 {
            tool.store_feedback(FeedbackEntry::new("topic", "x".repeat(5000), 1, 1.0));
        }
        assert!(!tool.optimize_with_feedback());
        assert_eq!(tool.params(), HyperParams::new(0.7, 1000));
    }

    #[tokio::test]
    async fn grown_budget_reaches_the_request() {
        use serde_json::json;
        use wiremock::{
            matchers::{body_partial_json, method, path},
            Mock, MockServer, ResponseTemplate,
        };

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({ "options": { "num_predict": 1100 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.2:3b",
                "message": { "role": "assistant", "content": "A longer article." },
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut tool = WriteArticleTool::new(
            AgentBuilder::default()
                .set_model("llama3.2:3b")
                .set_ollama_endpoint(server.uri())
                .set_max_retries(1),
        )
        .unwrap();
        for _ in 0..5 {
            tool.store_feedback(FeedbackEntry::new("topic", "x".repeat(950), 4, 3.5));
        }
        assert!(tool.optimize_with_feedback());

        let article = tool.execute("Sepsis", None).await.unwrap();
        assert_eq!(article, "A longer article.");
    }
}
