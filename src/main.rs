use std::{
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use healthcare_hub::{
    config::{DEFAULT_IMPROVE_THRESHOLD, DEFAULT_MODEL},
    feedback::{DEFAULT_FEEDBACK_FILE, DEFAULT_HUMAN_RATING},
    hub::parse_rating,
    init_tracing,
    reports::{combined_results, format_rating},
    AgentManager, AgentName, ChatSession, HubConfig, Notification, NotificationContent, TaskKind,
    DEFAULT_OLLAMA_URL,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader, Lines, Stdin},
    sync::mpsc,
};
use tracing::warn;

type InputLines = Lines<BufReader<Stdin>>;

/// Medical text agents on a local Ollama server, rated by you.
#[derive(Parser, Debug)]
#[command(name = "healthcare-hub", author, version, about, long_about = None)]
struct Cli {
    /// Ollama server address
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_OLLAMA_URL, global = true)]
    ollama_host: String,

    /// Model used by every agent
    #[arg(short, long, env = "HUB_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// Attempts per model call
    #[arg(long, env = "HUB_MAX_RETRIES", default_value_t = 2, global = true)]
    max_retries: usize,

    /// How long Ollama keeps the model loaded, e.g. 10m
    #[arg(long, env = "OLLAMA_KEEP_ALIVE", global = true)]
    keep_alive: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "HUB_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    /// JSON file collecting human ratings
    #[arg(long, env = "HUB_FEEDBACK_FILE", default_value = DEFAULT_FEEDBACK_FILE, global = true)]
    feedback_file: PathBuf,

    /// Directory reports are written to
    #[arg(long, env = "HUB_REPORT_DIR", default_value = ".", global = true)]
    report_dir: PathBuf,

    /// Average rating below which an improved output is generated
    #[arg(long, default_value_t = DEFAULT_IMPROVE_THRESHOLD, global = true)]
    improve_threshold: f64,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a medical text
    Summarize(TaskArgs),
    /// Write a research article on a topic, or refine a draft
    Refine {
        #[command(flatten)]
        task: TaskArgs,
        /// Optional outline the article should follow
        #[arg(long)]
        outline: Option<String>,
    },
    /// Mask protected health information
    Sanitize(TaskArgs),
    /// Talk to the medical assistant (/clear, /quit)
    Chat {
        /// Print the reply as it is generated
        #[arg(long)]
        stream: bool,
    },
    /// List the registered agents, or show one
    Agents { name: Option<String> },
    /// Rating statistics from the feedback file
    Stats,
}

#[derive(Args, Debug)]
struct TaskArgs {
    /// Input text
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the input from a file (stdin when neither is given)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Skip the human rating; nothing is stored
    #[arg(long, conflicts_with = "rating")]
    no_rate: bool,

    /// Rate without being asked
    #[arg(long, value_parser = rating_arg)]
    rating: Option<f64>,
}

fn rating_arg(s: &str) -> Result<f64, String> {
    parse_rating(s).ok_or_else(|| format!("'{s}' is not a rating between 1.0 and 5.0"))
}

impl Cli {
    fn hub_config(&self) -> HubConfig {
        HubConfig {
            model: self.model.clone(),
            ollama_host: self.ollama_host.clone(),
            max_retries: self.max_retries,
            keep_alive: self.keep_alive.clone(),
            request_timeout: self.timeout_secs.map(Duration::from_secs),
            feedback_file: self.feedback_file.clone(),
            report_dir: self.report_dir.clone(),
            improve_threshold: self.improve_threshold,
            stream_chat: matches!(self.command, Command::Chat { stream: true }),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = cli.hub_config();
    let mut manager = AgentManager::new(config).context("could not set up agents")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    match cli.command {
        Command::Summarize(args) => {
            run_task(&mut manager, &mut lines, TaskKind::Summarize, args, None).await
        }
        Command::Refine { task, outline } => {
            run_task(
                &mut manager,
                &mut lines,
                TaskKind::WriteArticle,
                task,
                outline,
            )
            .await
        }
        Command::Sanitize(args) => {
            run_task(&mut manager, &mut lines, TaskKind::Sanitize, args, None).await
        }
        Command::Chat { stream } => chat(&mut manager, &mut lines, stream).await,
        Command::Agents { name } => list_agents(&manager, name.as_deref()),
        Command::Stats => print_stats(&manager),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputSource {
    Argument,
    File,
    Stdin,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RatingPlan {
    Skip,
    Given(f64),
    Ask,
}

/// A piped input leaves nobody at the terminal to ask, so only an explicit
/// `--rating` is stored then.
fn rating_plan(args: &TaskArgs, source: InputSource) -> RatingPlan {
    match (args.no_rate, args.rating, source) {
        (true, _, _) => RatingPlan::Skip,
        (false, Some(rating), _) => RatingPlan::Given(rating),
        (false, None, InputSource::Stdin) => RatingPlan::Skip,
        (false, None, InputSource::Argument | InputSource::File) => RatingPlan::Ask,
    }
}

async fn read_input(args: &TaskArgs) -> Result<(String, InputSource)> {
    if let Some(text) = &args.text {
        return Ok((text.clone(), InputSource::Argument));
    }
    if let Some(path) = &args.file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        return Ok((text, InputSource::File));
    }
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    Ok((text, InputSource::Stdin))
}

fn headings(kind: TaskKind) -> (&'static str, &'static str) {
    match kind {
        TaskKind::Summarize => ("📝 Summary", "Please enter text to summarize."),
        TaskKind::WriteArticle => ("✍️ Refined Article", "Please enter an article topic or draft."),
        TaskKind::Sanitize => ("🔒 Sanitized Data", "Please enter data to sanitize."),
    }
}

async fn run_task(
    manager: &mut AgentManager,
    lines: &mut InputLines,
    kind: TaskKind,
    args: TaskArgs,
    outline: Option<String>,
) -> Result<()> {
    let (title, missing_input) = headings(kind);
    let (input, source) = read_input(&args).await?;
    if input.trim().is_empty() {
        bail!(missing_input);
    }

    if let Err(e) = manager.load_feedback_history() {
        warn!(error = %e, "earlier feedback ignored");
    }

    let run = manager
        .run_task(kind, input.trim(), outline.as_deref())
        .await?;

    println!("{title}\n{}\n", run.output);
    println!("🔍 Validation Report\n{}\n", run.validation);
    println!("🤖 AI Rating: {} / 5", run.ai_rating);
    if !run.keywords.is_empty() {
        let terms: Vec<String> = run
            .keywords
            .iter()
            .map(|(word, count)| format!("{word} ({count})"))
            .collect();
        println!("☁️ Key terms: {}", terms.join(", "));
    }

    let rating = match rating_plan(&args, source) {
        RatingPlan::Given(rating) => Some(rating),
        RatingPlan::Ask => prompt_rating(lines).await?,
        RatingPlan::Skip => {
            if source == InputSource::Stdin && !args.no_rate {
                eprintln!("Input was piped; pass --rating to store feedback.");
            }
            None
        }
    };
    let Some(rating) = rating else {
        println!("\n{}", combined_results(&run.output, &run.validation));
        return Ok(());
    };
    let outcome = manager.submit_rating(&run, rating).await?;

    println!("📈 Average Rating: {} / 5", format_rating(outcome.average));
    if outcome.tuned {
        let params = manager.validator(kind).params();
        println!(
            "⚙️ Validator now uses temperature {:.2}, max tokens {}",
            params.temperature, params.max_tokens
        );
    }
    if let Some(improved) = &outcome.improved {
        println!("\n✨ Improved output\n{improved}");
    }

    let path = outcome
        .report
        .write_to(&manager.config().report_dir)
        .context("could not write report")?;
    println!("\n⬇️ Report saved to {}", path.display());
    Ok(())
}

/// Ask until the answer is a valid rating. Enter takes the default; end of
/// input means no rating at all.
async fn prompt_rating<R>(lines: &mut Lines<R>) -> Result<Option<f64>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        print!("Your Rating (1.0 to 5.0) [{DEFAULT_HUMAN_RATING:.1}]: ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            return Ok(None);
        };
        if line.trim().is_empty() {
            return Ok(Some(DEFAULT_HUMAN_RATING));
        }
        match parse_rating(&line) {
            Some(rating) => return Ok(Some(rating)),
            None => eprintln!("Please enter a number between 1.0 and 5.0."),
        }
    }
}

fn print_token(notification: Notification) {
    if let NotificationContent::Token(token) = notification.content {
        print!("{}", token.value);
        let _ = io::stdout().flush();
    }
}

async fn chat(manager: &mut AgentManager, lines: &mut InputLines, stream: bool) -> Result<()> {
    let mut tokens: Option<mpsc::Receiver<Notification>> =
        stream.then(|| manager.chat_notifications());
    let manager: &AgentManager = manager;
    let mut session = ChatSession::new();

    println!("💬 Ask me anything about health. /clear resets the chat, /quit leaves.");
    loop {
        print!("🧑‍💻 You: ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("Chat cleared.");
                continue;
            }
            _ => {}
        }

        let result = match tokens.as_mut() {
            Some(rx) => {
                print!("🤖 AI: ");
                io::stdout().flush()?;
                let ask = session.ask(manager, input);
                tokio::pin!(ask);
                let result = loop {
                    tokio::select! {
                        res = &mut ask => break res,
                        Some(n) = rx.recv() => print_token(n),
                    }
                };
                while let Ok(n) = rx.try_recv() {
                    print_token(n);
                }
                println!();
                result.map(|_| ())
            }
            None => session
                .ask(manager, input)
                .await
                .map(|reply| println!("🤖 AI: {reply}")),
        };

        if let Err(e) = result {
            eprintln!("⚠️ {e}");
        }
    }
    Ok(())
}

fn list_agents(manager: &AgentManager, name: Option<&str>) -> Result<()> {
    if let Some(name) = name {
        let agent = manager.resolve(name)?;
        println!("{name}");
        println!("  name         : {}", agent.name);
        println!("  model        : {}", agent.model);
        println!("  temperature  : {:.2}", agent.temperature);
        println!("  max tokens   : {}", agent.max_tokens);
        println!("  max retries  : {}", agent.max_retries);
        return Ok(());
    }

    for name in AgentName::ALL {
        let agent = manager.agent(name);
        println!("{:<24} {:<28} {}", name, agent.name, name.description());
    }
    Ok(())
}

fn print_stats(manager: &AgentManager) -> Result<()> {
    let stats = manager.store().stats()?;
    println!("Feedback file: {}", manager.store().path().display());
    for s in stats {
        let ai = s.mean_ai_rating.map_or("-".to_string(), |r| format!("{r:.1}"));
        let human = s
            .mean_human_rating
            .map_or("-".to_string(), |r| format!("{r:.1}"));
        println!(
            "{:<14} {:>4} ratings   AI {:>4}   Human {:>4}",
            s.kind.section(),
            s.count,
            ai,
            human
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(no_rate: bool, rating: Option<f64>) -> TaskArgs {
        TaskArgs {
            text: None,
            file: None,
            no_rate,
            rating,
        }
    }

    #[test]
    fn piped_input_is_only_rated_explicitly() {
        assert_eq!(rating_plan(&args(false, None), InputSource::Stdin), RatingPlan::Skip);
        assert_eq!(
            rating_plan(&args(false, Some(4.5)), InputSource::Stdin),
            RatingPlan::Given(4.5)
        );
    }

    #[test]
    fn interactive_input_asks_unless_told_otherwise() {
        assert_eq!(rating_plan(&args(false, None), InputSource::Argument), RatingPlan::Ask);
        assert_eq!(rating_plan(&args(false, None), InputSource::File), RatingPlan::Ask);
        assert_eq!(rating_plan(&args(true, None), InputSource::Argument), RatingPlan::Skip);
    }

    #[tokio::test]
    async fn end_of_input_is_no_rating() {
        let mut lines = BufReader::new(&b""[..]).lines();
        assert_eq!(prompt_rating(&mut lines).await.unwrap(), None);
    }

    #[tokio::test]
    async fn prompt_retries_until_valid_and_enter_takes_default() {
        let mut lines = BufReader::new(&b"seven\n4.5\n"[..]).lines();
        assert_eq!(prompt_rating(&mut lines).await.unwrap(), Some(4.5));

        let mut lines = BufReader::new(&b"\n"[..]).lines();
        assert_eq!(
            prompt_rating(&mut lines).await.unwrap(),
            Some(DEFAULT_HUMAN_RATING)
        );
    }
}
