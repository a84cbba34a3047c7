//! Readers of persisted history: debt ranking, velocity, forecasts and the
//! executive summary. Nothing here feeds back into interpretation or risk
//! scoring.

pub mod auditor;
pub mod insights;

pub use auditor::{velocity, AutonomousAuditor, DebtTarget, Forecast, Trend};
pub use insights::{
    build_report, debt_points, ExecutiveInsights, ExecutiveMetrics, ExecutiveReport, Verdict,
    VelocityRisk,
};
