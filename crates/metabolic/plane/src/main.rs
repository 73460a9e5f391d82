//! Metabolic control plane replay tool
//!
//! Loads a configuration, replays a JSON command script against a fresh
//! control plane, and prints the merged audit log as JSON lines.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use holographic_router::{AcceptAllVerifier, DigestVerifier, ScoreTable, SignatureVerifier};
use metabolic_plane::{init_tracing, parse_script, ControlPlane, PlaneConfig, ScriptRunner};
use metabolic_types::{AuditSink, JsonLinesAuditSink};

/// Metabolic control plane CLI
#[derive(Parser)]
#[command(name = "metabolic-plane")]
#[command(about = "Replay a command script against the metabolic control plane", long_about = None)]
#[command(version)]
struct Cli {
    /// Command script (JSON array)
    script: PathBuf,

    /// Configuration file path
    #[arg(short, long, env = "METABOLIC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overrides the configured level)
    #[arg(long, env = "METABOLIC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "METABOLIC_LOG_JSON")]
    json: bool,

    /// Also print each step's outcome before the audit log
    #[arg(long)]
    steps: bool,

    /// Accept unsigned health frames
    #[arg(long)]
    insecure: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = PlaneConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    config.log.json |= cli.json;
    init_tracing(&config.log).context("initializing tracing")?;

    let raw = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("reading script {}", cli.script.display()))?;
    let commands = parse_script(&raw).context("parsing script")?;

    let scores = Arc::new(ScoreTable::new());
    let verifier: Arc<dyn SignatureVerifier> = if cli.insecure {
        Arc::new(AcceptAllVerifier)
    } else {
        Arc::new(DigestVerifier)
    };
    let plane = ControlPlane::new(&config, scores.clone(), verifier);
    let mut runner = ScriptRunner::new(plane, scores);
    let steps = runner.run(commands);

    let stdout = std::io::stdout();
    if cli.steps {
        let mut out = stdout.lock();
        for step in &steps {
            serde_json::to_writer(&mut out, step)?;
            out.write_all(b"\n")?;
        }
    }

    let sink = JsonLinesAuditSink::new(std::io::stdout());
    for (source, record) in runner.plane().audit_trail() {
        sink.record(&source, &record);
    }
    sink.into_inner().flush()?;

    tracing::info!(
        commands = steps.len(),
        epoch = runner.plane().epoch(),
        "Replay complete"
    );
    Ok(())
}
