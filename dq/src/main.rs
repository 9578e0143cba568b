//! adq - agentic decision quality
//!
//! CLI entry point: runs the pipeline, pauses and resumes around
//! clarifying questions, and prints output schemas.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

use agentic_dq::cli::{Cli, Command, OutputFormat, get_log_path};
use agentic_dq::clarify::PendingClarification;
use agentic_dq::config::Config;
use agentic_dq::domain::{
    AlternativesOutput, ClarificationAnswer, CriticOutput, DecisionBrief, DecisionRequest,
    FinalOutput, PreferencesOutput, QuestionerOutput, UncertaintiesOutput,
};
use agentic_dq::llm::{LlmClient, create_client};
use agentic_dq::pipeline::{Pipeline, RunOptions};
use agentic_dq::progress::ProgressEvent;
use agentic_dq::render::render_text;
use agentic_dq::validation::OutputSchema;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir).context("Failed to create log directory")?;
    }

    // CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;
    info!(provider = %config.llm.provider, model = %config.llm.resolved_model(), "adq loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run {
            title,
            narrative,
            questioner,
            interactive,
            save_pending,
            output,
            format,
        } => {
            let opts = RunArgs {
                questioner: questioner || config.pipeline.use_questioner,
                interactive,
                save_pending,
                output,
                format,
            };
            cmd_run(&config, title, narrative, opts).await
        }
        Command::Resume {
            pending,
            answers,
            output,
            format,
        } => cmd_resume(&config, &pending, &answers, output.as_deref(), format).await,
        Command::Schema { name } => cmd_schema(&name),
    }
}

struct RunArgs {
    questioner: bool,
    interactive: bool,
    save_pending: Option<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
}

async fn cmd_run(config: &Config, title: Option<String>, narrative: Option<String>, args: RunArgs) -> Result<()> {
    debug!(?title, questioner = args.questioner, interactive = args.interactive, "cmd_run: called");
    let mut rl: Option<DefaultEditor> = None;

    let title = match title {
        Some(t) => t,
        None => prompt_line(&mut rl, "Decision title")?,
    };
    let narrative = match narrative {
        Some(n) => n,
        None => prompt_line(&mut rl, "Describe the decision (constraints, preferences, context)")?,
    };
    let request = DecisionRequest::new(title, narrative).map_err(|e| eyre!("{}: {}", e.kind(), e))?;

    let pipeline = build_pipeline(config)?;
    let observer = print_progress;
    let options = RunOptions {
        use_questioner: args.questioner,
        answers: None,
        observer: Some(&observer),
    };
    let output = pipeline
        .run(&request, options)
        .await
        .map_err(|e| eyre!("{}: {}", e.kind(), e))?;

    if !output.is_pending() {
        return emit(&output, args.output.as_deref(), &args.format);
    }

    let pending = PendingClarification::from_stub(&request, &output)?;
    if args.interactive {
        let answers = ask_questions(&mut rl, &pending)?;
        let options = RunOptions::default()
            .with_answers(pending.answer(answers))
            .with_observer(&observer);
        let output = pipeline
            .run(&request, options)
            .await
            .map_err(|e| eyre!("{}: {}", e.kind(), e))?;
        return emit(&output, args.output.as_deref(), &args.format);
    }

    if let Some(path) = &args.save_pending {
        let json = serde_json::to_string_pretty(&pending)?;
        fs::write(path, json).context(format!("Failed to write pending state to {}", path.display()))?;
        eprintln!(
            "{} Waiting for clarification; answer the questions and run `adq resume {} --answers FILE`",
            "?".yellow(),
            path.display()
        );
    }
    emit(&output, args.output.as_deref(), &args.format)
}

async fn cmd_resume(
    config: &Config,
    pending_path: &Path,
    answers_path: &Path,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    debug!(?pending_path, ?answers_path, "cmd_resume: called");
    let content = fs::read_to_string(pending_path)
        .context(format!("Failed to read pending state from {}", pending_path.display()))?;
    let pending: PendingClarification = serde_json::from_str(&content).context("Invalid pending state file")?;
    if !pending.is_current() {
        return Err(eyre!(
            "StaleClarificationError: pending state does not match its request; start a new run"
        ));
    }

    let content = fs::read_to_string(answers_path)
        .context(format!("Failed to read answers from {}", answers_path.display()))?;
    // YAML parses JSON too
    let answers: Vec<ClarificationAnswer> = serde_yaml::from_str(&content).context("Invalid answers file")?;
    let answers = pending.answer(answers);
    answers
        .verify(&pending.request)
        .map_err(|e| eyre!("{}: {}", e.kind(), e))?;

    let pipeline = build_pipeline(config)?;
    let observer = print_progress;
    let options = RunOptions::default().with_answers(answers).with_observer(&observer);
    let out = pipeline
        .run(&pending.request, options)
        .await
        .map_err(|e| eyre!("{}: {}", e.kind(), e))?;
    emit(&out, output, &format)
}

fn cmd_schema(name: &str) -> Result<()> {
    debug!(%name, "cmd_schema: called");
    let schema = match name {
        "DecisionBrief" => OutputSchema::of::<DecisionBrief>(),
        "QuestionerOutput" => OutputSchema::of::<QuestionerOutput>(),
        "AlternativesOutput" => OutputSchema::of::<AlternativesOutput>(),
        "PreferencesOutput" => OutputSchema::of::<PreferencesOutput>(),
        "UncertaintiesOutput" => OutputSchema::of::<UncertaintiesOutput>(),
        "CriticOutput" => OutputSchema::of::<CriticOutput>(),
        "FinalOutput" => OutputSchema::of::<FinalOutput>(),
        _ => {
            return Err(eyre!(
                "Unknown schema: {}. Use: DecisionBrief, QuestionerOutput, AlternativesOutput, \
                 PreferencesOutput, UncertaintiesOutput, CriticOutput, FinalOutput",
                name
            ));
        }
    };
    println!("{}", schema.pretty());
    Ok(())
}

fn build_pipeline(config: &Config) -> Result<Pipeline> {
    config.validate()?;
    let llm: Arc<dyn LlmClient> = create_client(&config.llm).context("Failed to create LLM client")?;
    debug!(client = llm.name(), "build_pipeline: client created");
    Ok(Pipeline::from_config(config, llm))
}

fn print_progress(event: &ProgressEvent) {
    eprintln!("{} {}", format!("[{:>3}%]", event.percent).dimmed(), event.label);
}

/// Files always get the full JSON; stdout gets the chosen format
fn emit(output: &FinalOutput, path: Option<&Path>, format: &OutputFormat) -> Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    if let Some(path) = path {
        fs::write(path, &json).context(format!("Failed to write output to {}", path.display()))?;
        eprintln!("{} Wrote {}", "✓".green(), path.display());
    }

    match format {
        OutputFormat::Text => print!("{}", render_text(output)),
        OutputFormat::Json if path.is_none() => println!("{}", json),
        OutputFormat::Json => {}
    }
    Ok(())
}

fn editor(rl: &mut Option<DefaultEditor>) -> Result<&mut DefaultEditor> {
    if rl.is_none() {
        *rl = Some(DefaultEditor::new().map_err(|e| eyre!("Failed to initialize readline: {}", e))?);
    }
    rl.as_mut().ok_or_else(|| eyre!("readline unavailable"))
}

fn prompt_line(rl: &mut Option<DefaultEditor>, label: &str) -> Result<String> {
    let rl = editor(rl)?;
    loop {
        match rl.readline(&format!("{} {} ", label.bold(), ">".bright_green())) {
            Ok(line) if !line.trim().is_empty() => return Ok(line.trim().to_string()),
            Ok(_) => continue,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Err(eyre!("Cancelled")),
            Err(e) => return Err(eyre!("Failed to read input: {}", e)),
        }
    }
}

fn ask_questions(rl: &mut Option<DefaultEditor>, pending: &PendingClarification) -> Result<Vec<ClarificationAnswer>> {
    eprintln!(
        "{}",
        "Clarifying questions (empty line skips; answer at least one)".cyan().bold()
    );
    let editor = editor(rl)?;

    pending.collect(
        |q| {
            eprintln!("\n{}", q.question());
            for (i, option) in q.options().iter().enumerate() {
                eprintln!("  {}. {}", i + 1, option);
            }
            match editor.readline(&format!("{} ", ">".bright_green())) {
                Ok(line) => Ok(line),
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Err(eyre!("Cancelled")),
                Err(e) => Err(eyre!("Failed to read input: {}", e)),
            }
        },
        || eprintln!("\n{}", "At least one answer is required; asking again.".yellow()),
    )
}
