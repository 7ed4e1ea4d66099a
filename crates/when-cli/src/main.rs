use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::filter::EnvFilter;
use when_engine::{
    truncate_for_display, GrainFilter, ReferenceContext, ResolveOptions, ResolvedExpression,
    Resolver, StaticClassifier,
};

#[derive(Parser)]
#[command(name = "when")]
#[command(about = "Resolve the time mentions of a message into timestamp tokens", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a message against a recorded classifier response
    Resolve(ResolveArgs),
    /// Show the reference time that would be sent to the classifier
    Context(ReferenceArgs),
}

#[derive(Args)]
struct ReferenceArgs {
    /// IANA timezone of the message author (e.g. America/Los_Angeles)
    #[arg(short, long, env = "WHEN_TIMEZONE")]
    timezone: Option<String>,

    /// When the message was written (RFC 3339). Defaults to now.
    #[arg(long, env = "WHEN_REFERENCE_TIME")]
    at: Option<String>,
}

#[derive(Args)]
struct ResolveArgs {
    /// Message text
    text: String,

    /// Classifier response JSON file (use - for stdin)
    #[arg(short, long)]
    response: PathBuf,

    #[command(flatten)]
    reference: ReferenceArgs,

    /// Which grains to resolve: date, time or both
    #[arg(short, long, default_value = "both")]
    grains: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markup)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One line per mention: `text: <t:EPOCH:STYLE>, ...`
    Markup,
    /// Resolved expressions as JSON
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Resolve(args) => resolve(args).await,
        Commands::Context(args) => {
            let ctx = reference_context(&args)?;
            println!("{}", ctx.classifier_time());
            Ok(())
        }
    }
}

async fn resolve(args: ResolveArgs) -> Result<()> {
    let ctx = reference_context(&args.reference)?;
    let grain_filter: GrainFilter = args.grains.parse()?;
    let payload = read_response(&args.response)?;
    debug!(reference = %ctx.classifier_time(), ?grain_filter, "resolving message");

    let resolver = Resolver::new(StaticClassifier::responding(payload));
    let expressions = resolver
        .resolve_with_options(&args.text, &ctx, &ResolveOptions::with_grain_filter(grain_filter))
        .await?;

    match args.format {
        OutputFormat::Markup => {
            for line in markup_lines(&expressions) {
                println!("{line}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&expressions)
                .context("Failed to serialize expressions")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn markup_lines(expressions: &[ResolvedExpression]) -> Vec<String> {
    expressions
        .iter()
        .map(|e| {
            format!(
                "{}: {}",
                truncate_for_display(&e.source_text, 70),
                e.markup().join(", ")
            )
        })
        .collect()
}

fn reference_context(args: &ReferenceArgs) -> Result<ReferenceContext> {
    let ctx = match (&args.at, &args.timezone) {
        (Some(at), Some(tz)) => {
            let instant = DateTime::parse_from_rfc3339(at)
                .with_context(|| format!("Invalid reference time '{at}'"))?;
            ReferenceContext::in_timezone(instant.with_timezone(&Utc), tz)?
        }
        (Some(at), None) => ReferenceContext::from_rfc3339(at)?,
        (None, tz) => ReferenceContext::in_timezone(Utc::now(), tz.as_deref().unwrap_or("UTC"))?,
    };
    Ok(ctx)
}

fn read_response(path: &Path) -> Result<Value> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read response from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read response file {}", path.display()))?
    };
    serde_json::from_str(&raw).context("Classifier response is not valid JSON")
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
