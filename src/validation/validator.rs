use tracing::{info, instrument};

use crate::{
    feedback::{FeedbackEntry, HyperParams, TuningPolicy, ValidationHistory},
    tasks::TaskKind,
    validation::{extract_score, improvement_messages, validation_messages},
    Agent, AgentBuildError, AgentBuilder, AgentError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// The model's free-form report.
    pub report: String,
    /// Score read out of the report, 1..=5.
    pub ai_rating: u8,
}

/// Grades one task's outputs and learns from the human ratings of them.
#[derive(Debug, Clone)]
pub struct Validator {
    kind: TaskKind,
    agent: Agent,
    params: HyperParams,
    policy: TuningPolicy,
    history: ValidationHistory,
}

impl Validator {
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 512;

    pub fn new(kind: TaskKind, builder: AgentBuilder) -> Result<Self, AgentBuildError> {
        let agent = builder
            .set_name(Self::agent_name(kind))
            .set_temperature(Self::TEMPERATURE)
            .set_max_tokens(Self::MAX_TOKENS)
            .build()?;
        Ok(Self {
            kind,
            agent,
            params: HyperParams::new(Self::TEMPERATURE, Self::MAX_TOKENS),
            policy: TuningPolicy::validator(),
            history: ValidationHistory::default(),
        })
    }

    pub fn agent_name(kind: TaskKind) -> &'static str {
        match kind {
            TaskKind::Summarize => "SummarizeValidatorAgent",
            TaskKind::WriteArticle => "WriteArticleValidatorAgent",
            TaskKind::Sanitize => "SanitizeDataValidatorAgent",
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
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

    #[instrument(level = "debug", skip_all, fields(kind = %self.kind))]
    pub async fn execute(
        &self,
        original: &str,
        output: &str,
    ) -> Result<ValidationOutcome, AgentError> {
        let report = self
            .agent
            .call_model_with(
                validation_messages(self.kind, original, output),
                self.params.temperature,
                self.params.max_tokens,
            )
            .await?;
        let ai_rating = extract_score(&report);
        info!(kind = %self.kind, ai_rating, "validation scored");
        Ok(ValidationOutcome { report, ai_rating })
    }

    /// Ask for a better version of `output`, using this validator's model.
    #[instrument(level = "debug", skip_all, fields(kind = %self.kind))]
    pub async fn improve(&self, original: &str, output: &str) -> Result<String, AgentError> {
        self.agent
            .call_model(improvement_messages(self.kind, original, output))
            .await
    }

    pub fn store_feedback(&mut self, entry: FeedbackEntry) {
        info!(
            agent = Self::agent_name(self.kind),
            ai_rating = entry.ai_rating,
            human_rating = entry.human_rating,
            "Stored feedback"
        );
        self.history.push(entry);
    }

    /// Seed the history with ratings from earlier runs without logging each one.
    pub fn preload(&mut self, entries: Vec<FeedbackEntry>) {
        self.history.extend(entries);
    }

    /// Re-tune sampling from the ratings collected so far.
    pub fn optimize_with_feedback(&mut self) -> bool {
        let changed = self.params.tune(&self.history, &self.policy);
        if changed {
            info!(
                agent = Self::agent_name(self.kind),
                temperature = self.params.temperature,
                max_tokens = self.params.max_tokens,
                "Adjusted Ollama settings"
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, Request, ResponseTemplate,
    };

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2:3b",
            "message": { "role": "assistant", "content": content },
            "done": true
        }))
    }

    fn builder(server: &MockServer) -> AgentBuilder {
        AgentBuilder::default()
            .set_model("llama3.2:3b")
            .set_ollama_endpoint(server.uri())
            .set_max_retries(1)
    }

    #[tokio::test]
    async fn execute_scores_the_report() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({ "options": { "num_predict": 512 } })))
            .respond_with(reply("Covers the key points.\nRating: 4"))
            .expect(1)
            .mount(&server)
            .await;

        let validator = Validator::new(TaskKind::Summarize, builder(&server)).unwrap();
        let outcome = validator.execute("long text", "short").await.unwrap();
        assert_eq!(outcome.ai_rating, 4);
        assert!(outcome.report.starts_with("Covers"));
        assert_eq!(validator.agent().name, "SummarizeValidatorAgent");
    }

    #[tokio::test]
    async fn improve_uses_improver_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "messages": [{ "role": "system", "content": "You are a medical data sanitizer improver." }]
            })))
            .respond_with(reply("[PATIENT_NAME] seen on [DATE]."))
            .expect(1)
            .mount(&server)
            .await;

        let validator = Validator::new(TaskKind::Sanitize, builder(&server)).unwrap();
        let better = validator
            .improve("John seen on 1 May.", "John seen on [DATE].")
            .await
            .unwrap();
        assert_eq!(better, "[PATIENT_NAME] seen on [DATE].");
    }

    #[test]
    fn poor_ratings_cool_the_validator() {
        let server_less = AgentBuilder::default().set_model("m");
        let mut validator = Validator::new(TaskKind::WriteArticle, server_less).unwrap();
        for _ in 0..5 {
            validator.store_feedback(FeedbackEntry::new("t", "a", 2, 1.0));
        }
        assert!(validator.optimize_with_feedback());
        assert!((validator.params().temperature - 0.65).abs() < 1e-6);
        assert_eq!(validator.history().len(), 5);
    }

    #[tokio::test]
    async fn tuned_params_are_sent_with_the_next_validation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({ "options": { "num_predict": 562 } })))
            .and(|req: &Request| {
                serde_json::from_slice::<serde_json::Value>(&req.body)
                    .ok()
                    .and_then(|body| body["options"]["temperature"].as_f64())
                    .is_some_and(|t| (t - 0.65).abs() < 1e-3)
            })
            .respond_with(reply("Too long.\nRating: 2"))
            .expect(1)
            .mount(&server)
            .await;

        let mut validator = Validator::new(TaskKind::Summarize, builder(&server)).unwrap();
        for _ in 0..5 {
            validator.store_feedback(FeedbackEntry::new("t", "y".repeat(461), 3, 1.0));
        }
        assert!(validator.optimize_with_feedback());

        let outcome = validator.execute("long text", "short").await.unwrap();
        assert_eq!(outcome.ai_rating, 2);
    }
}
