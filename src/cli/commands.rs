//! Command handlers: build the engine, ingest, run one operation, render.

use super::args::{Cli, Commands};
use super::setup::{configure_thread_pool, resolve_config};
use crate::io::{write_report, OutputFormat};
use crate::pipeline::Engine;
use anyhow::Result;
use std::io::Write;

/// Outcome of a command as seen by the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// A mandatory gate failed
    GateFailed,
}

pub fn run(cli: Cli) -> Result<CommandStatus> {
    let mut config = resolve_config(cli.config.as_deref())?;
    if cli.no_store {
        config.store.enabled = false;
    }
    if let Some(jobs) = cli.jobs {
        config.ingest.jobs = jobs;
    }
    configure_thread_pool(config.ingest.jobs);

    let mut engine = Engine::new(config);
    let ingest = engine.ingest(&cli.paths)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&mut engine, cli.command, ingest, cli.format.into(), &mut out)
}

/// Run one command against an engine that has already ingested
pub fn execute(
    engine: &mut Engine,
    command: Commands,
    ingest: crate::pipeline::IngestReport,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    match command {
        Commands::Ingest => write_report(&ingest, format, out)?,
        Commands::Analyze { scope } => write_report(&engine.analyze(&scope)?, format, out)?,
        Commands::Risk { scope } => write_report(&engine.score_risk(&scope)?, format, out)?,
        Commands::Policy { scope } => write_report(&engine.check_policy(&scope), format, out)?,
        Commands::Forecast { source } => {
            write_report(&engine.get_forecast(&source)?, format, out)?
        }
        Commands::Compare { a, b } => write_report(&engine.compare(&a, &b)?, format, out)?,
        Commands::Plan { target } => write_report(&engine.plan_refactor(&target)?, format, out)?,
        Commands::Blueprint => write_report(&engine.blueprint(), format, out)?,
        Commands::Insights => write_report(&engine.insights()?, format, out)?,
        Commands::Alert => {
            let health = engine.check_policy("").health_score;
            let alert = engine.proactive_alert(health)?;
            match format {
                OutputFormat::Json => writeln!(out, "{}", serde_json::json!({ "alert": alert }))?,
                OutputFormat::Terminal => {
                    writeln!(out, "{}", alert.as_deref().unwrap_or("No alerts"))?
                }
            }
        }
        Commands::Gate { shadow } => {
            let report = engine.gate(shadow)?;
            write_report(&report, format, out)?;
            if report.blocks() {
                return Ok(CommandStatus::GateFailed);
            }
        }
        Commands::Recall { keyword } => {
            write_report(engine.recall(&keyword)?.as_slice(), format, out)?
        }
    }
    Ok(CommandStatus::Success)
}
