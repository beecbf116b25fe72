use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use intent_engine::{IntentResolver, ResolveError, ResolverConfig};
use intent_protocol::{serialize_json_pretty, ErrorEnvelope, Preferences, ProjectContext};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod llm;
mod report;

use llm::{GeneratorSettings, OpenAiCompatibleGenerator};

/// Exit status for input the caller should re-prompt for.
const EXIT_EMPTY_INPUT: i32 = 2;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "intent")]
#[command(about = "Turn vague programming requests into concrete interpretations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,

    /// Resolver configuration file (TOML, overrides INTENT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one request into ranked interpretations
    Resolve(ResolveArgs),

    /// Print the effective resolver configuration as TOML
    Config,
}

#[derive(Args)]
struct ResolveArgs {
    /// Request text, or `-` to read it from stdin
    text: String,

    /// Project context file (JSON)
    #[arg(long)]
    context: Option<PathBuf>,

    /// User preferences file (JSON)
    #[arg(long)]
    preferences: Option<PathBuf>,

    /// Output the full result as JSON
    #[arg(long)]
    json: bool,

    /// Skip the AI-assisted producer even when an API key is configured
    #[arg(long)]
    no_assist: bool,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // JSON output keeps stdout clean for parsing
    if matches!(&cli.command, Commands::Resolve(args) if args.json) {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // reqwest/hyper internals are noisy at debug
    if !cli.verbose {
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = ResolverConfig::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Resolve(args) => run_resolve(args, config).await?,
        Commands::Config => print_stdout(config.to_toml_string()?.trim_end())?,
    }

    Ok(())
}

async fn run_resolve(args: ResolveArgs, mut config: ResolverConfig) -> Result<()> {
    let text = if args.text == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        strip_line_ending(buf)
    } else {
        args.text.clone()
    };

    let context: Option<ProjectContext> = args
        .context
        .as_deref()
        .map(|path| read_json(path, "project context"))
        .transpose()?;
    let preferences: Option<Preferences> = args
        .preferences
        .as_deref()
        .map(|path| read_json(path, "preferences"))
        .transpose()?;

    if args.no_assist {
        config.assist.enabled = false;
    }
    let resolver = build_resolver(config)?;
    log::debug!(
        "Resolver ready: assist={} timeout={:?}",
        if resolver.has_generator() { "on" } else { "off" },
        resolver.config().assist.timeout()
    );

    match resolver
        .resolve_or_fallback(&text, context.as_ref(), preferences.as_ref())
        .await
    {
        Ok(result) => {
            if args.json {
                print_stdout(&serialize_json_pretty(&result)?)?;
            } else {
                print_stdout(report::render_text_report(&result).trim_end())?;
            }
            Ok(())
        }
        Err(err @ ResolveError::EmptyInput) => {
            let envelope = ErrorEnvelope::new(err.code(), "The request text is empty")
                .with_details(json!({ "inputChars": text.chars().count() }))
                .with_hint("Describe what you would like done, e.g. \"fix the login error\"");
            if args.json {
                print_stdout(&serialize_json_pretty(&envelope)?)?;
            } else {
                eprintln!("Error: {}", envelope.message);
                if let Some(hint) = &envelope.hint {
                    eprintln!("Hint: {hint}");
                }
            }
            std::process::exit(EXIT_EMPTY_INPUT);
        }
        Err(err) => Err(err.into()),
    }
}

fn build_resolver(config: ResolverConfig) -> Result<IntentResolver> {
    let assist_enabled = config.assist.enabled;
    let resolver = IntentResolver::new(config);
    if !assist_enabled {
        return Ok(resolver);
    }
    match GeneratorSettings::from_env() {
        Some(settings) => {
            log::debug!(
                "Assist enabled via {} (model {})",
                settings.base_url,
                settings.model
            );
            let generator = OpenAiCompatibleGenerator::new(settings)?;
            Ok(resolver.with_generator(Arc::new(generator)))
        }
        None => {
            log::debug!(
                "No {} or {} set; running rules only",
                llm::API_KEY_ENV,
                llm::OPENAI_API_KEY_ENV
            );
            Ok(resolver)
        }
    }
}

/// Drop the single line ending a shell pipe or heredoc appends, so stdin and
/// argument input resolve identically.
fn strip_line_ending(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid {what} in {}", path.display()))
}
