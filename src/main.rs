//! Tweet feature extractor: binary entrypoint.
//!
//! `extract` reads one raw tweet per stdin line and prints one JSON `FeatureRecord` per line.
//! `stream` reads one JSON tweet event per line and prints the payloads worth pushing.

use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tweet_feature_extractor::stream::{
    KeywordFilter, Snooze, StreamListener, TweetEvent, DEFAULT_SNOOZE_SECS,
};
use tweet_feature_extractor::{FeatureAssembler, FeatureConfig, Resources};

#[derive(Parser, Debug)]
#[command(name = "tweet-features")]
#[command(about = "Turn raw tweets into sentiment feature records")]
struct Args {
    /// Config file (defaults to $FEATURES_CONFIG_PATH or config/features.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log as JSON lines instead of compact text
    #[arg(long, default_value = "false")]
    log_json: bool,

    /// Print Prometheus metrics to stderr on exit
    #[arg(long, default_value = "false")]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One raw document per line → one JSON feature record per line
    Extract {
        /// Process the whole input with the rayon pool
        #[arg(long, default_value = "false")]
        parallel: bool,
    },
    /// One JSON tweet event per line → payloads to push
    Stream {
        /// Keywords that must all appear in the text
        #[arg(short, long)]
        keyword: Vec<String>,

        /// Keywords that must not appear
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Accept every text regardless of keywords
        #[arg(long, default_value = "false")]
        no_strict: bool,

        /// Minimum seconds between pushed payloads
        #[arg(long, default_value_t = DEFAULT_SNOOZE_SECS)]
        snooze_secs: i64,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tweet_feature_extractor=info,features=info,warn"));
    let registry = tracing_subscriber::registry().with(filter);
    // logs go to stderr; stdout carries the records
    if json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(io::stderr))
            .init();
    }
}

fn build_assembler(config: Option<PathBuf>) -> Result<FeatureAssembler> {
    let cfg = match config {
        Some(p) => {
            let mut cfg = FeatureConfig::load_from(&p)?;
            cfg.apply_env_overrides();
            cfg
        }
        None => FeatureConfig::load_default()?,
    };
    Ok(Resources::load(&cfg)?.into_assembler())
}

fn run_extract(fx: &FeatureAssembler, parallel: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout().lock());
    if parallel {
        let lines = stdin
            .lock()
            .lines()
            .collect::<io::Result<Vec<String>>>()
            .context("reading stdin")?;
        for rec in fx.transform_parallel(&lines) {
            serde_json::to_writer(&mut out, &rec)?;
            out.write_all(b"\n")?;
        }
    } else {
        let mut n = 0usize;
        for line in stdin.lock().lines() {
            let line = line.context("reading stdin")?;
            serde_json::to_writer(&mut out, &fx.extract(&line))?;
            out.write_all(b"\n")?;
            n += 1;
        }
        info!(target: "features", documents = n, "extract finished");
    }
    out.flush()?;
    Ok(())
}

fn run_stream(fx: &FeatureAssembler, filter: KeywordFilter, snooze_secs: i64) -> Result<()> {
    let mut listener = StreamListener::new(fx, filter, Snooze::new(snooze_secs, chrono::Utc::now()));
    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout().lock());
    for (i, line) in stdin.lock().lines().enumerate() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let event: TweetEvent = match serde_json::from_str(&line) {
            Ok(ev) => ev,
            Err(e) => {
                warn!(target: "stream", line = i + 1, error = %e, "skipping malformed event");
                continue;
            }
        };
        if let Some(payload) = listener.on_event(&event, chrono::Utc::now()) {
            serde_json::to_writer(&mut out, &payload)?;
            out.write_all(b"\n")?;
            out.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.log_json);

    let metrics: Option<PrometheusHandle> = if args.metrics {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("installing prometheus recorder")?,
        )
    } else {
        None
    };

    let fx = build_assembler(args.config)?;

    match args.command {
        Command::Extract { parallel } => run_extract(&fx, parallel)?,
        Command::Stream {
            keyword,
            exclude,
            no_strict,
            snooze_secs,
        } => run_stream(&fx, KeywordFilter::new(keyword, exclude, !no_strict), snooze_secs)?,
    }

    if let Some(handle) = metrics {
        eprintln!("{}", handle.render());
    }
    Ok(())
}
