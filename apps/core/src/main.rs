// QueryLens Core Entry Point
// Loads question records, runs one analysis and prints the report as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use querylens_core::actors::{AnalysisActor, AnalysisActorHandle};
use querylens_core::config::{AppConfig, LogFormat};
use querylens_core::models::{AnalysisRequest, LexicalMode, VerbConfig};
use querylens_core::source;

#[derive(Debug, Parser)]
#[command(name = "querylens-core", version, about = "Analyze user questions")]
struct Cli {
    /// JSON file with question records (overrides QUERYLENS_DATA_FILE)
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Record field holding the question text (overrides QUERYLENS_QUESTION_FIELD)
    #[arg(long, value_name = "NAME")]
    field: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Word frequencies for a word cloud
    WordCloud {
        /// Keep only verbs
        #[arg(long)]
        verbs: bool,

        /// Verb setting such as includeModals=true or minLength=4 (repeatable)
        #[arg(long = "setting", value_name = "KEY=VALUE")]
        settings: Vec<String>,
    },
    /// Intent category counts
    QuestionTypes,
    /// Sentiment bucket counts
    Sentiment,
    /// Interrogative-word counts
    QuestionWords,
}

impl Command {
    fn into_request(self, questions: Vec<String>) -> AnalysisRequest {
        match self {
            Command::WordCloud { verbs: false, .. } => AnalysisRequest::lexical(questions, LexicalMode::All),
            Command::WordCloud { verbs: true, settings } => {
                AnalysisRequest::lexical(questions, LexicalMode::Verbs)
                    .with_verb_config(VerbConfig::from_pairs(settings))
            }
            Command::QuestionTypes => AnalysisRequest::intents(questions),
            Command::Sentiment => AnalysisRequest::sentiment(questions),
            Command::QuestionWords => AnalysisRequest::question_words(questions),
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new(
                "querylens-core".to_string(),
                std::io::stderr,
            ))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(file) = cli.file {
        config.data_file = file;
    }
    if let Some(field) = cli.field {
        config.question_field = field;
    }
    init_tracing(config.log_format);
    info!(?config, "Starting QueryLens core");

    let batch = source::load_questions(&config.data_file, &config.question_field)
        .with_context(|| format!("Failed to read {}", config.data_file.display()))?;
    let request = cli
        .command
        .into_request(batch.questions)
        .with_record_count(batch.record_count);

    let actor = AnalysisActorHandle::from_config(&config);
    match actor.analyze(request).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) if e.is_input_empty() => {
            let body = serde_json::json!({
                "error": "No data available",
                "detail": e.to_string(),
                "recordCount": batch.record_count,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(2);
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            Err(e.into())
        }
    }
}
