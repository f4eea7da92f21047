//! MMSearch Reward - transcript scoring CLI
//!
//! The `mmsearch-reward` command scores agent transcripts with the reward
//! engine from `mmsearch-reward-core`.
//!
//! ## Commands
//!
//! - `score`: score a single episode
//! - `check-format`: report the transcript shape and search signal only
//! - `batch`: score a JSONL file of episodes in parallel

mod batch;
mod report;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mmsearch_reward_core::{
    obs, validate_transcript, Episode, GrammarReport, RewardMode, ScoringConfig, TranscriptShape,
};
use serde::Serialize;
use tracing::{info, Level};

use crate::batch::{render_jsonl, run_batch, BatchConfig};
use crate::report::{write_summary_json, BatchSummary};

#[derive(Parser)]
#[command(name = "mmsearch-reward")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Score search-augmented agent transcripts", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    scoring: ScoringArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Base scoring config. Per-episode `extra_info` keys override these.
#[derive(Args, Debug, Clone)]
struct ScoringArgs {
    /// Correctness predicate: EM or SubEM
    #[arg(long, global = true, env = "MMSR_REWARD_MODE", default_value = "EM")]
    reward_mode: RewardMode,

    /// Discount applied to a correct answer that used search
    #[arg(long, global = true, env = "MMSR_SEARCH_PENALTY", default_value_t = 0.1)]
    search_penalty: f64,

    /// Weight of the format-compliance term
    #[arg(long, global = true, env = "MMSR_FORMAT_PENALTY", default_value_t = 0.1)]
    format_penalty: f64,

    /// Apply the search penalty once per search invocation
    #[arg(long, global = true, env = "MMSR_USE_SEARCH_COUNT_PENALTY")]
    use_search_count_penalty: bool,
}

impl ScoringArgs {
    fn to_config(&self) -> Result<ScoringConfig> {
        let config = ScoringConfig::default()
            .with_reward_mode(self.reward_mode)
            .with_search_penalty(self.search_penalty)
            .with_format_penalty(self.format_penalty)
            .with_search_count_penalty(self.use_search_count_penalty);
        config.validate().context("invalid scoring flags")?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single episode
    Score {
        /// Episode JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        episode: PathBuf,

        /// Print every intermediate signal as JSON instead of the bare reward
        #[arg(long)]
        breakdown: bool,
    },

    /// Check transcript format without scoring correctness
    CheckFormat {
        /// Episode JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        episode: PathBuf,
    },

    /// Score a JSONL file of episodes
    Batch {
        /// Input JSONL, one episode per line
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSONL (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum episodes scored concurrently (default: available cores)
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Write an aggregate summary JSON here
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Fail if any episode is rejected
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Debug, Serialize)]
struct FormatCheckOutput {
    shape: TranscriptShape,
    format_compliant: bool,
    search_invoked: bool,
    search_count: u32,
}

impl From<GrammarReport> for FormatCheckOutput {
    fn from(report: GrammarReport) -> Self {
        Self {
            shape: report.shape,
            format_compliant: report.format_compliant(),
            search_invoked: report.search_invoked(),
            search_count: report.search_count,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    mmsearch_reward_core::init_tracing(cli.json, level);

    let base = cli.scoring.to_config()?;

    match cli.command {
        Commands::Score { episode, breakdown } => {
            let out = cmd_score(&episode, &base, breakdown)?;
            println!("{}", out);
            Ok(())
        }
        Commands::CheckFormat { episode } => {
            let out = cmd_check_format(&episode)?;
            println!("{}", out);
            Ok(())
        }
        Commands::Batch {
            input,
            output,
            concurrency,
            summary,
            strict,
        } => {
            cmd_batch(
                &input,
                output.as_deref(),
                concurrency,
                summary.as_deref(),
                strict,
                base,
            )
            .await
        }
    }
}

fn read_episode(path: &Path) -> Result<Episode> {
    let raw = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("read episode from stdin")?
    } else {
        std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?
    };
    Episode::from_json(&raw).with_context(|| format!("parse episode {:?}", path))
}

fn cmd_score(path: &Path, base: &ScoringConfig, breakdown: bool) -> Result<String> {
    let episode = read_episode(path)?;
    let _span = episode.id.as_deref().map(obs::EpisodeSpan::enter);
    let result = episode
        .score_breakdown(base)
        .context("episode could not be scored")?;

    if breakdown {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(result.reward.to_string())
    }
}

fn cmd_check_format(path: &Path) -> Result<String> {
    let episode = read_episode(path)?;
    let report = validate_transcript(&episode.responses).map_err(|violation| {
        obs::emit_contract_violation(&violation);
        violation
    })?;
    Ok(serde_json::to_string_pretty(&FormatCheckOutput::from(
        report,
    ))?)
}

async fn cmd_batch(
    input: &Path,
    output: Option<&Path>,
    concurrency: Option<usize>,
    summary_path: Option<&Path>,
    strict: bool,
    base: ScoringConfig,
) -> Result<()> {
    let started = Instant::now();
    let raw = std::fs::read_to_string(input).with_context(|| format!("read {:?}", input))?;

    let mut batch_config = BatchConfig::default();
    if let Some(n) = concurrency {
        batch_config.concurrency = n;
    }
    info!(
        input = %input.display(),
        concurrency = batch_config.concurrency,
        reward_mode = %base.reward_mode,
        "scoring batch"
    );

    let outcomes = run_batch(&raw, base, &batch_config).await?;
    let rendered = render_jsonl(&outcomes)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("write {:?}", path))?
        }
        None => print!("{}", rendered),
    }

    let summary = BatchSummary::from_outcomes(&outcomes, raw.as_bytes(), base);
    obs::emit_batch_finished(
        summary.total_episodes,
        summary.rejected_episodes,
        summary.mean_reward,
        started.elapsed().as_millis() as u64,
    );
    if let Some(path) = summary_path {
        write_summary_json(path, &summary)?;
    }

    if strict && summary.rejected_episodes > 0 {
        bail!(
            "{} of {} episodes were rejected",
            summary.rejected_episodes,
            summary.total_episodes
        );
    }
    Ok(())
}
