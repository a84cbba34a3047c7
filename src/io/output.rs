use crate::audit::{ExecutiveReport, Forecast, VelocityRisk};
use crate::comparison::{ComparisonResult, Winner};
use crate::pipeline::{
    AnalysisReport, Blueprint, GateReport, IngestReport, PlanOutcome, RiskReport,
};
use crate::policy::{PolicyReport, Severity};
use crate::risk::Classification;
use crate::store::Interaction;
use colored::*;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

/// Human-readable rendering of a report
pub trait TerminalReport {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()>;
}

/// Write `report` in the requested format
pub fn write_report<T>(report: &T, format: OutputFormat, writer: &mut dyn Write) -> anyhow::Result<()>
where
    T: Serialize + TerminalReport + ?Sized,
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            writeln!(writer, "{json}")?;
        }
        OutputFormat::Terminal => report.write_terminal(writer)?,
    }
    Ok(())
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

fn heading(writer: &mut dyn Write, title: &str) -> anyhow::Result<()> {
    writeln!(writer, "{}", title.bold().blue())?;
    writeln!(writer)?;
    Ok(())
}

fn warnings(writer: &mut dyn Write, warnings: &[String]) -> anyhow::Result<()> {
    for warning in warnings {
        writeln!(writer, "{} {}", "warning:".yellow().bold(), warning)?;
    }
    Ok(())
}

fn colored_classification(classification: Classification) -> ColoredString {
    let label = classification.as_str();
    match classification {
        Classification::Red => label.red().bold(),
        Classification::Orange => label.truecolor(255, 165, 0),
        Classification::Yellow => label.yellow(),
        Classification::Blue => label.blue(),
        Classification::Green => label.green(),
    }
}

fn health(score: f64) -> ColoredString {
    let text = format!("{score:.1}");
    if score >= 90.0 {
        text.green()
    } else if score >= 70.0 {
        text.yellow()
    } else {
        text.red()
    }
}

impl TerminalReport for IngestReport {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, "Ingestion")?;
        writeln!(writer, "  Files scanned:  {}", self.files_scanned)?;
        writeln!(writer, "  Total lines:    {}", self.total_loc)?;
        writeln!(
            writer,
            "  Baseline:       complexity {:.2}, imports {:.2}",
            self.updated_baseline.avg_complexity, self.updated_baseline.avg_imports
        )?;
        for (source, reason) in &self.unreadable {
            writeln!(writer, "  {} {}: {}", "unreadable".red(), source, reason)?;
        }
        if self.cancelled {
            writeln!(writer, "  {}", "Cancelled before completion".yellow())?;
        }
        warnings(writer, &self.warnings)
    }
}

impl TerminalReport for AnalysisReport {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, "Analysis")?;
        let mut t = table(vec!["Source", "Role", "Rel. complexity", "Risk", "Tier", "Confidence"]);
        for file in &self.per_file {
            t.add_row(vec![
                file.source.clone(),
                file.role.label().to_string(),
                format!("{:.2}x", file.relative_complexity),
                format!("{:.1}", file.risk_score),
                file.classification.as_str().to_string(),
                format!("{:.2}", file.confidence),
            ]);
        }
        writeln!(writer, "{t}")?;

        for file in &self.per_file {
            writeln!(writer, "  {}: {}", file.source.bold(), file.judgement_summary)?;
        }
        if !self.smells.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "{}", "Smells".bold())?;
            for smell in &self.smells {
                writeln!(writer, "  - {smell}")?;
            }
        }
        writeln!(writer)?;
        writeln!(writer, "Health score: {}", health(self.health_score))?;
        warnings(writer, &self.warnings)
    }
}

impl TerminalReport for RiskReport {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, "Fragility")?;
        let mut nodes: Vec<_> = self.nodes.values().collect();
        nodes.sort_by(|a, b| b.total_risk_score.total_cmp(&a.total_risk_score));

        let mut t = table(vec![
            "Source",
            "Structural",
            "Volatility",
            "Knowledge",
            "Criticality",
            "Total",
            "Tier",
        ]);
        for node in nodes {
            t.add_row(vec![
                node.source.clone(),
                format!("{:.2}", node.structural_risk),
                format!("{:.2}", node.volatility_risk),
                format!("{:.2}", node.knowledge_risk),
                format!("{:.2}", node.criticality_risk),
                format!("{:.1}", node.total_risk_score),
                node.classification.as_str().to_string(),
            ]);
        }
        writeln!(writer, "{t}")?;
        if !self.history_available {
            writeln!(writer, "{}", "Version history unavailable".yellow())?;
        }
        warnings(writer, &self.warnings)
    }
}

impl TerminalReport for PolicyReport {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, "Policy")?;
        if self.violations.is_empty() {
            writeln!(writer, "  {} No violations", "✓".green())?;
        }
        for violation in &self.violations {
            let severity = match violation.severity {
                Severity::Blocker | Severity::Critical => violation.severity.as_str().red().bold(),
                Severity::Warning => violation.severity.as_str().yellow(),
                _ => violation.severity.as_str().normal(),
            };
            writeln!(
                writer,
                "  [{}] {} {}",
                severity,
                violation.rule.id().bold(),
                violation.message
            )?;
            writeln!(writer, "      mitigation: {}", violation.mitigation)?;
        }
        writeln!(writer)?;
        writeln!(writer, "Health score: {}", health(self.health_score))?;
        Ok(())
    }
}

impl TerminalReport for Forecast {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, &format!("Forecast: {}", self.source))?;
        writeln!(writer, "  Trend:              {}", capitalize_first(self.trend.as_str()))?;
        writeln!(writer, "  Velocity:           {:+.2} per snapshot", self.velocity)?;
        writeln!(writer, "  Current health:     {}", health(self.current_health))?;
        writeln!(
            writer,
            "  Predicted health:   {} in {} snapshots",
            health(self.predicted_health),
            self.horizon
        )?;
        writeln!(writer, "  Projected complexity: {:.1}", self.projected_complexity)?;
        if self.insufficient_history {
            writeln!(writer, "  {}", "Not enough history for a trend".dimmed())?;
        }
        Ok(())
    }
}

impl TerminalReport for ComparisonResult {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, &format!("{} vs {}", self.target_a, self.target_b))?;
        let mut t = table(vec!["Metric", "A", "B", "Delta %"]);
        for diff in &self.diffs {
            t.add_row(vec![
                diff.metric.clone(),
                format!("{:.0}", diff.a),
                format!("{:.0}", diff.b),
                format!("{:+.1}", diff.delta_percent),
            ]);
        }
        writeln!(writer, "{t}")?;
        let winner = match &self.winner {
            Winner::A(source) | Winner::B(source) => source.green().bold(),
            Winner::Tie => "tie".normal(),
        };
        writeln!(writer, "Winner: {winner}")?;
        writeln!(writer, "{}", self.rationale)?;
        Ok(())
    }
}

impl TerminalReport for PlanOutcome {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, &format!("Refactor plan: {}", self.source))?;
        match &self.plan {
            Some(plan) => {
                writeln!(writer, "  Goal: {}", plan.goal)?;
                for (i, step) in plan.steps.iter().enumerate() {
                    writeln!(writer, "  {}. {}", i + 1, step)?;
                }
                writeln!(writer, "  Risk level:    {}", plan.risk_level)?;
                writeln!(writer, "  Expected gain: {}", plan.expected_gain)?;
            }
            None => writeln!(writer, "  {}", self.message)?,
        }
        writeln!(writer, "  Confidence:    {:.2}", self.confidence)?;
        Ok(())
    }
}

impl TerminalReport for Blueprint {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, "Blueprint")?;
        writeln!(
            writer,
            "  {} files, {} functions, {} classes, {} dependency edges",
            self.files, self.functions, self.classes, self.edges
        )?;
        for (role, count) in &self.roles {
            writeln!(writer, "  {:<22} {}", role.label(), count)?;
        }
        if !self.top_fan_in.is_empty() {
            writeln!(writer)?;
            let mut t = table(vec!["Module", "Fan-in"]);
            for (module, count) in &self.top_fan_in {
                t.add_row(vec![module.clone(), count.to_string()]);
            }
            writeln!(writer, "{t}")?;
        }
        Ok(())
    }
}

impl TerminalReport for ExecutiveReport {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, "Executive summary")?;
        let m = &self.metrics;
        writeln!(
            writer,
            "  Generated:             {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(writer, "  Structural units:      {}", m.total_structural_units)?;
        writeln!(writer, "  Debt points:           {:.1}", m.debt_points)?;
        writeln!(writer, "  Architectural health:  {}", health(m.architectural_health))?;
        writeln!(writer, "  Technical debt cost:   {:.0}", m.technical_debt_cost)?;
        let velocity = match m.velocity_risk {
            VelocityRisk::High => "HIGH".red().bold(),
            VelocityRisk::Stable => "STABLE".green(),
        };
        writeln!(writer, "  Velocity risk:         {velocity}")?;
        writeln!(writer)?;
        writeln!(writer, "{}", self.verdict.label().bold())?;
        for rec in &self.recommendations {
            writeln!(writer, "  - {rec}")?;
        }
        for node in &self.hotspots {
            writeln!(
                writer,
                "  {} {} ({:.1})",
                colored_classification(node.classification),
                node.source,
                node.total_risk_score
            )?;
        }
        Ok(())
    }
}

impl TerminalReport for GateReport {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, "Gate")?;
        for node in &self.red_nodes {
            writeln!(
                writer,
                "  {} {} ({:.1})",
                colored_classification(node.classification),
                node.source,
                node.total_risk_score
            )?;
        }
        writeln!(
            writer,
            "  Health {} (minimum {:.1})",
            health(self.health_score),
            self.min_health
        )?;
        let status = if self.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        let mode = if self.shadow { " (shadow mode)" } else { "" };
        writeln!(writer, "  {status}{mode}")?;
        warnings(writer, &self.warnings)
    }
}

impl TerminalReport for [Interaction] {
    fn write_terminal(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        heading(writer, "Recall")?;
        if self.is_empty() {
            writeln!(writer, "  No matching interactions")?;
        }
        for interaction in self {
            let when = chrono::DateTime::from_timestamp_millis(interaction.timestamp_ms as i64)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            writeln!(
                writer,
                "  {} {} {} - {}",
                when.dimmed(),
                interaction.operation.bold(),
                interaction.target,
                interaction.summary
            )?;
        }
        Ok(())
    }
}
