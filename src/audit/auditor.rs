use crate::config::AuditConfig;
use crate::errors::Result;
use crate::store::{HistorySnapshot, KnowledgeStore, PersistedAnalysis};
use serde::Serialize;
use std::fmt;

const FULL_HEALTH: f64 = 100.0;

/// Direction of complexity change over recent snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Stable,
    Degradation,
    Optimization,
}

impl Trend {
    pub fn from_velocity(velocity: f64) -> Self {
        if velocity > 0.0 {
            Trend::Degradation
        } else if velocity < 0.0 {
            Trend::Optimization
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Stable => "stable",
            Trend::Degradation => "degradation",
            Trend::Optimization => "optimization",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub source: String,
    pub velocity: f64,
    pub current_health: f64,
    pub predicted_health: f64,
    /// Complexity expected after `horizon` more snapshots at the current velocity
    pub projected_complexity: f64,
    pub horizon: u32,
    pub trend: Trend,
    /// Fewer than two snapshots; velocity is reported as zero
    pub insufficient_history: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtTarget {
    pub source: String,
    pub debt: usize,
    pub analysis: PersistedAnalysis,
}

impl Forecast {
    /// Forecast for a source with no recorded history
    pub fn neutral(source: impl Into<String>, horizon: u32) -> Self {
        Self {
            source: source.into(),
            velocity: 0.0,
            current_health: FULL_HEALTH,
            predicted_health: FULL_HEALTH,
            projected_complexity: 0.0,
            horizon,
            trend: Trend::Stable,
            insufficient_history: true,
        }
    }
}

/// Complexity change per snapshot over `history` (newest first).
///
/// Fewer than two snapshots is not an error; the velocity is zero.
pub fn velocity(history: &[HistorySnapshot]) -> f64 {
    match (history.first(), history.last()) {
        (Some(newest), Some(oldest)) if history.len() >= 2 => {
            (newest.complexity - oldest.complexity) / (history.len() - 1) as f64
        }
        _ => 0.0,
    }
}

pub struct AutonomousAuditor<'a> {
    store: &'a KnowledgeStore,
    config: AuditConfig,
}

impl<'a> AutonomousAuditor<'a> {
    pub fn new(store: &'a KnowledgeStore, config: AuditConfig) -> Self {
        Self { store, config }
    }

    /// Stored analysis with the highest debt score; ties go to the first source
    pub fn identify_primary_debt(&self) -> Result<Option<DebtTarget>> {
        let best = self
            .store
            .all_analyses()?
            .into_iter()
            .map(|analysis| (analysis.debt_score(), analysis))
            .reduce(|best, next| if next.0 > best.0 { next } else { best });

        Ok(best.map(|(debt, analysis)| DebtTarget {
            source: analysis.source.clone(),
            debt,
            analysis,
        }))
    }

    /// Linear extrapolation of health `horizon` snapshots ahead
    pub fn forecast(&self, source: &str) -> Result<Forecast> {
        let history = self.store.history(source, self.config.history_limit)?;
        let velocity = velocity(&history);
        let (current_health, current_complexity) = history
            .first()
            .map_or((FULL_HEALTH, 0.0), |s| (s.health_score, s.complexity));
        let horizon = f64::from(self.config.horizon);

        let predicted_health =
            (current_health - velocity * self.config.decay_rate * horizon).max(0.0);

        Ok(Forecast {
            source: source.to_string(),
            velocity,
            current_health,
            predicted_health,
            projected_complexity: current_complexity + velocity * horizon,
            horizon: self.config.horizon,
            trend: Trend::from_velocity(velocity),
            insufficient_history: history.len() < 2,
        })
    }

    /// Warning about the worst offender, raised only when health is below
    /// full or its velocity exceeds the alert threshold.
    pub fn proactive_alert(&self, health_score: f64) -> Result<Option<String>> {
        let Some(target) = self.identify_primary_debt()? else {
            return Ok(None);
        };
        let forecast = self.forecast(&target.source)?;

        if health_score >= FULL_HEALTH && forecast.velocity <= self.config.velocity_alert_threshold {
            return Ok(None);
        }

        let mut message = format!(
            "ARCHITECTURAL FORECAST: `{}` is degrading (velocity: {:.2}).",
            target.source, forecast.velocity
        );
        if forecast.predicted_health < self.config.forecast_alert_health {
            message.push_str(&format!(
                " High risk of structural failure in {} cycles. Proactive refactor recommended.",
                forecast.horizon
            ));
        } else {
            message.push_str(&format!(
                " Structural health currently {:.0}%. Fix architectural debt?",
                health_score
            ));
        }
        Ok(Some(message))
    }
}
