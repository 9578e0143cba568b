//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// adq - structured decision briefs from free-text problems
#[derive(Parser)]
#[command(
    name = "adq",
    about = "Turn a decision problem into a brief with alternatives, preferences and uncertainties",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the pipeline for a new decision
    Run {
        /// Decision title (prompted for when missing)
        #[arg(short, long)]
        title: Option<String>,

        /// Decision narrative (prompted for when missing)
        #[arg(short, long)]
        narrative: Option<String>,

        /// Ask clarifying questions before building the brief
        #[arg(short, long)]
        questioner: bool,

        /// Answer clarifying questions at the prompt and continue immediately
        #[arg(short, long, requires = "questioner")]
        interactive: bool,

        /// Where to write the pending state when the run pauses
        #[arg(long, value_name = "FILE")]
        save_pending: Option<PathBuf>,

        /// Write the output to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Resume a paused run with answers to its questions
    Resume {
        /// Pending state written by `run --save-pending`
        #[arg(value_name = "PENDING")]
        pending: PathBuf,

        /// JSON or YAML list of {question_id, answer}
        #[arg(short, long, value_name = "FILE")]
        answers: PathBuf,

        /// Write the output to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Print the JSON Schema of a structured output type
    Schema {
        /// Type name (DecisionBrief, QuestionerOutput, AlternativesOutput, ...)
        name: String,
    },
}

/// Output format for run results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            _ => Err(format!("Unknown format: {}. Use: json, text", s)),
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agentic-dq")
        .join("logs")
        .join("adq.log")
}
