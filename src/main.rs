use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use std::{fs, io::Read};

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use offerguard::{
    agents::{ml::MlModel, run_agents, AgentContext},
    config::load_config,
    core::{
        hash::assessment_fingerprint,
        output::{render, write_report, OutputFormat},
        store::HistoryStore,
    },
    intake::{route_input, structure_text},
    pipeline::Assessor,
};

#[derive(Parser, Debug)]
#[command(
    name = "offerguard",
    about = "Advisory risk screening for internship offers"
)]
struct Cli {
    /// Message text to assess; reads stdin when no input flag is given
    text: Option<String>,
    /// Read the message from a file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Fetch the message from a URL
    #[arg(long)]
    url: Option<String>,
    /// Path to config file (TOML). Default: config/offerguard.toml
    #[arg(long)]
    config: Option<String>,
    /// Output format
    #[arg(long, default_value = "text", value_enum)]
    format: FormatArg,
    /// Write the report to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    /// SQLite path for assessment history
    #[arg(long, default_value = "data/offerguard.db")]
    db_path: String,
    /// Skip history persistence
    #[arg(long)]
    no_history: bool,
    /// Disable all network access (URL input, site reachability probe)
    #[arg(long)]
    no_network: bool,
    /// Increase verbosity (info, debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Optional log file path
    #[arg(long, default_value = "data/offerguard.log")]
    log_file: String,
}

#[derive(ValueEnum, Clone, Debug)]
enum FormatArg {
    Json,
    Md,
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Md => OutputFormat::Markdown,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli)?;

    let config = Arc::new(load_config(cli.config.as_deref())?);
    let assessor = Assessor::new(config.clone())?;

    let client = if cli.no_network {
        None
    } else {
        Some(
            reqwest::Client::builder()
                .user_agent(config.agents.user_agent.clone())
                .timeout(Duration::from_millis(config.agents.request_timeout_ms))
                .redirect(reqwest::redirect::Policy::limited(4))
                .build()?,
        )
    };

    let model = match MlModel::load(Path::new(&config.agents.ml_model_path)) {
        Ok(model) => Some(model),
        Err(err) => {
            tracing::warn!(
                "ML model unavailable ({err}); assessments will omit the ml source"
            );
            None
        }
    };

    let stdin_text;
    let text_input = match (&cli.text, &cli.file, &cli.url) {
        (Some(text), _, _) => Some(text.as_str()),
        (None, None, None) => {
            stdin_text = read_stdin()?;
            Some(stdin_text.as_str())
        }
        _ => None,
    };

    let raw_text = route_input(
        text_input,
        cli.file.as_deref(),
        cli.url.as_deref(),
        client.as_ref(),
    )
    .await?;
    let intake = structure_text(&raw_text)?;

    let ctx = AgentContext {
        config: &config,
        client: client.as_ref(),
        model: model.as_ref(),
    };
    let record = run_agents(&intake, &ctx).await;
    let (result, payload) = assessor.assess_with_result(&record);
    tracing::info!(
        score = result.score,
        category = result.category.label(),
        "assessment complete"
    );

    if !cli.no_history {
        record_history(&cli.db_path, &intake.raw_text, &record, &result);
    }

    let format: OutputFormat = cli.format.into();
    match &cli.output {
        Some(path) => {
            write_report(&payload, format, path)?;
            tracing::info!("report written to {}", path.display());
        }
        None => println!("{}", render(&payload, format)?),
    }

    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| anyhow!("failed to read stdin: {e}"))?;
    Ok(buf)
}

/// Persist the outcome and bump pattern counters for flagged sources.
/// History is best-effort; a broken store never fails an assessment.
fn record_history(
    db_path: &str,
    raw_text: &str,
    record: &offerguard::core::record::SignalRecord,
    result: &offerguard::core::record::RiskResult,
) {
    let mut store = match HistoryStore::open(Path::new(db_path)) {
        Ok(store) => store,
        Err(err) => {
            tracing::warn!("history store unavailable: {err}");
            return;
        }
    };

    let fingerprint = assessment_fingerprint(raw_text);
    if let Err(err) = store.record_assessment(&fingerprint, result) {
        tracing::warn!("failed to record assessment: {err}");
    }

    for (source, points) in result.breakdown.iter() {
        if matches!(source, "company" | "payment" | "behavior") && points > 0 {
            if let Err(err) = store.record_pattern(source, "flagged") {
                tracing::warn!("failed to record pattern: {err}");
            }
        }
    }
    if let Some(ml) = &record.ml {
        if ml.used {
            if let Err(err) = store.record_pattern("ml", ml.level.as_str()) {
                tracing::warn!("failed to record pattern: {err}");
            }
        }
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_path = Path::new(&cli.log_file);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    if log_path.exists() {
        if let Ok(meta) = fs::metadata(log_path) {
            if meta.len() > 1_000_000 {
                let rotated = log_path.with_extension("log.1");
                let _ = fs::rename(log_path, rotated);
            }
        }
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(false);

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init tracing: {e}"))
}
