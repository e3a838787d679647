use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    config::HubConfig,
    feedback::{FeedbackEntry, FeedbackStore},
    hub::{AgentName, HubError},
    keywords::{top_terms, DEFAULT_MAX_WORDS},
    notifications::Notification,
    reports::Report,
    tasks::{ChatbotAgent, SanitizeDataTool, SummarizeTool, TaskKind, WriteArticleTool},
    validation::Validator,
    Agent,
};

/// One generated and validated output, waiting for a human rating.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRun {
    pub id: Uuid,
    pub kind: TaskKind,
    pub original: String,
    pub output: String,
    pub validation: String,
    pub ai_rating: u8,
    /// Most frequent terms of the text the user cares about for this task.
    pub keywords: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
pub struct RatingOutcome {
    pub average: f64,
    pub improved: Option<String>,
    /// Whether the rating moved any sampling parameter.
    pub tuned: bool,
    pub report: Report,
}

/// Owns every agent and the feedback file, and runs the
/// generate, validate, rate, improve pipeline.
#[derive(Debug)]
pub struct AgentManager {
    config: HubConfig,
    store: FeedbackStore,
    summarizer: SummarizeTool,
    writer: WriteArticleTool,
    sanitizer: SanitizeDataTool,
    chatbot: ChatbotAgent,
    summarize_validator: Validator,
    write_article_validator: Validator,
    sanitize_data_validator: Validator,
}

impl AgentManager {
    pub fn new(config: HubConfig) -> Result<Self, HubError> {
        let builder = config.agent_builder();
        let manager = Self {
            store: FeedbackStore::new(&config.feedback_file),
            summarizer: SummarizeTool::new(builder.clone())?,
            writer: WriteArticleTool::new(builder.clone())?,
            sanitizer: SanitizeDataTool::new(builder.clone())?,
            chatbot: ChatbotAgent::new(builder.clone().set_stream(config.stream_chat))?,
            summarize_validator: Validator::new(TaskKind::Summarize, builder.clone())?,
            write_article_validator: Validator::new(TaskKind::WriteArticle, builder.clone())?,
            sanitize_data_validator: Validator::new(TaskKind::Sanitize, builder)?,
            config,
        };
        info!(model = %manager.config.model, "agents registered");
        Ok(manager)
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn store(&self) -> &FeedbackStore {
        &self.store
    }

    /// Look an agent up by its registered name.
    pub fn resolve(&self, name: &str) -> Result<&Agent, HubError> {
        Ok(self.agent(name.parse()?))
    }

    pub fn agent(&self, name: AgentName) -> &Agent {
        match name {
            AgentName::Summarize => self.summarizer.agent(),
            AgentName::WriteArticle => self.writer.agent(),
            AgentName::SanitizeData => self.sanitizer.agent(),
            AgentName::SummarizeValidator => self.summarize_validator.agent(),
            AgentName::WriteArticleValidator => self.write_article_validator.agent(),
            AgentName::SanitizeDataValidator => self.sanitize_data_validator.agent(),
            AgentName::Chatbot => self.chatbot.agent(),
        }
    }

    pub fn validator(&self, kind: TaskKind) -> &Validator {
        match kind {
            TaskKind::Summarize => &self.summarize_validator,
            TaskKind::WriteArticle => &self.write_article_validator,
            TaskKind::Sanitize => &self.sanitize_data_validator,
        }
    }

    fn validator_mut(&mut self, kind: TaskKind) -> &mut Validator {
        match kind {
            TaskKind::Summarize => &mut self.summarize_validator,
            TaskKind::WriteArticle => &mut self.write_article_validator,
            TaskKind::Sanitize => &mut self.sanitize_data_validator,
        }
    }

    pub fn writer(&self) -> &WriteArticleTool {
        &self.writer
    }

    /// Seed every history from the feedback file and tune once, so ratings
    /// from earlier sessions keep counting. Returns the number of entries read.
    pub fn load_feedback_history(&mut self) -> Result<usize, HubError> {
        let mut loaded = 0;
        for kind in TaskKind::ALL {
            let entries = self.store.entries(kind)?;
            if entries.is_empty() {
                continue;
            }
            loaded += entries.len();
            if kind == TaskKind::WriteArticle {
                self.writer.preload(entries.clone());
                self.writer.optimize_with_feedback();
            }
            let validator = self.validator_mut(kind);
            validator.preload(entries);
            validator.optimize_with_feedback();
        }
        info!(loaded, path = %self.store.path().display(), "feedback history loaded");
        Ok(loaded)
    }

    /// Generate the task output for `input` and have it validated.
    ///
    /// For [`TaskKind::WriteArticle`] the input is a topic or a draft, and
    /// `outline` is an optional structure for the article.
    #[instrument(level = "debug", skip(self, input, outline))]
    pub async fn run_task(
        &self,
        kind: TaskKind,
        input: &str,
        outline: Option<&str>,
    ) -> Result<TaskRun, HubError> {
        let output = match kind {
            TaskKind::Summarize => self.summarizer.execute(input).await,
            TaskKind::WriteArticle => self.writer.execute(input, outline).await,
            TaskKind::Sanitize => self.sanitizer.execute(input).await,
        }
        .map_err(HubError::Generation)?;

        let outcome = self
            .validator(kind)
            .execute(input, &output)
            .await
            .map_err(HubError::Validation)?;

        let keywords = match kind {
            TaskKind::Summarize => top_terms(input, DEFAULT_MAX_WORDS),
            TaskKind::WriteArticle | TaskKind::Sanitize => top_terms(&output, DEFAULT_MAX_WORDS),
        };

        let run = TaskRun {
            id: Uuid::new_v4(),
            kind,
            original: input.to_string(),
            output,
            validation: outcome.report,
            ai_rating: outcome.ai_rating,
            keywords,
        };
        info!(run_id = %run.id, %kind, ai_rating = run.ai_rating, "task validated");
        Ok(run)
    }

    /// Record a human rating for `run`: remember it, persist it, retune,
    /// and request an improved output when the average is poor.
    #[instrument(level = "debug", skip(self, run), fields(run_id = %run.id, kind = %run.kind))]
    pub async fn submit_rating(
        &mut self,
        run: &TaskRun,
        human_rating: f64,
    ) -> Result<RatingOutcome, HubError> {
        if !(1.0..=5.0).contains(&human_rating) {
            return Err(HubError::InvalidRating(human_rating));
        }
        let kind = run.kind;
        let entry = FeedbackEntry::new(&run.original, &run.output, run.ai_rating, human_rating)
            .with_validation(&run.validation);

        self.store.append(kind, &entry)?;

        let mut tuned = false;
        if kind == TaskKind::WriteArticle {
            self.writer.store_feedback(entry.clone());
            tuned |= self.writer.optimize_with_feedback();
        }
        let validator = self.validator_mut(kind);
        validator.store_feedback(entry.clone());
        tuned |= validator.optimize_with_feedback();

        let average = entry.average();
        let improved = if average < self.config.improve_threshold {
            match self.validator(kind).improve(&run.original, &run.output).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(error = %e, %kind, "could not generate improved output");
                    None
                }
            }
        } else {
            None
        };

        let mut report = Report::new(
            kind,
            &run.original,
            &run.output,
            &run.validation,
            run.ai_rating,
            human_rating,
        );
        if let Some(text) = &improved {
            report = report.with_improved(text);
        }

        Ok(RatingOutcome {
            average,
            improved,
            tuned,
            report,
        })
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn chat(&self, input: &str) -> Result<String, HubError> {
        self.chatbot.execute(input).await.map_err(HubError::Generation)
    }

    /// Receiver for chatbot events; tokens arrive when streaming is on.
    pub fn chat_notifications(&mut self) -> mpsc::Receiver<Notification> {
        self.chatbot.subscribe()
    }
}

/// Parse a rating typed by the user. Accepts `1` to `5` with decimals.
pub fn parse_rating(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|r| (1.0..=5.0).contains(r))
}
