use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use scriptline_core::{MediaRef, Provider, format_timeline};
use tokio::fs;

use crate::{
    pipeline::{build_pipeline, load_summary},
    report::print_report,
};

mod pipeline;
mod report;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Gemini,
    Openai,
    Grok,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Gemini => Provider::Gemini,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
        }
    }
}

#[derive(Parser)]
#[command(name = "scriptline")]
#[command(about = "Extract a time-segmented script from a long video with a multimodal model")]
struct Cli {
    /// Media summary JSON (title, cast, length, time windows)
    summary: PathBuf,

    /// URI of the uploaded video the model should watch
    #[arg(short, long, env = "SCRIPTLINE_MEDIA_URI")]
    media: String,

    /// MIME type of the video
    #[arg(long, default_value = "video/mp4")]
    mime_type: String,

    /// Content type used to pick the prompt template
    #[arg(short, long, default_value = "default")]
    content_type: String,

    /// Prompt template file registered for the content type
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Number of concurrent inference workers
    #[arg(short, long, env = "SCRIPTLINE_WORKERS", default_value_t = 4)]
    workers: usize,

    /// AI provider for segment extraction
    #[arg(short, long, default_value = "gemini")]
    provider: CliProvider,

    /// OpenAI-compatible endpoint to use instead of the provider's public one
    #[arg(long, env = "SCRIPTLINE_API_URL")]
    api_url: Option<String>,

    /// Model name; defaults to the provider's model
    #[arg(long, env = "SCRIPTLINE_MODEL")]
    model: Option<String>,

    /// Retries per window on transport errors, 429 and 5xx
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    /// Where to write the assembled media JSON
    #[arg(short, long, default_value = "media.json")]
    output: PathBuf,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scriptline=info,scriptline_core=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let provider: Provider = cli.provider.clone().into();

    // Validate API key early
    if let Err(e) = provider.validate_api_key() {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    println!(
        "\n{}  {}\n",
        style("scriptline").cyan().bold(),
        style("Script Extractor").dim()
    );

    let summary = load_summary(&cli.summary).await?;
    println!(
        "{} Loaded: {} {}",
        style("✓").green().bold(),
        style(&summary.title).yellow(),
        style(format!(
            "[{} windows, {}s]",
            summary.segment_time_stamps.len(),
            summary.length_in_seconds
        ))
        .dim()
    );

    let pipeline = build_pipeline(&cli, &provider).await?;
    println!("{}", style("─".repeat(60)).dim());

    let total_start = Instant::now();
    let spinner = create_spinner(&format!(
        "Extracting segments with {} ({} workers)...",
        provider.name(),
        cli.workers.max(1)
    ));
    let media = MediaRef {
        uri: cli.media.clone(),
        mime_type: cli.mime_type.clone(),
    };
    let report = pipeline.run(summary, media, &cli.content_type).await;
    spinner.finish_with_message(format!(
        "{} Extraction finished {}",
        style("✓").green().bold(),
        style(format!("[{}]", format_duration(total_start.elapsed()))).dim()
    ));

    print_report(&report);

    let Some(media) = report.media else {
        anyhow::bail!("no timeline could be assembled; see errors above");
    };

    let json = serde_json::to_string_pretty(media.as_ref())?;
    fs::write(&cli.output, json).await?;
    println!(
        "\n{} {}\n",
        style("Saved:").dim(),
        style(cli.output.display()).cyan()
    );
    println!("{}", style("─".repeat(60)).dim());

    // Human-readable output
    println!("{}", format_timeline(&media));

    Ok(())
}
