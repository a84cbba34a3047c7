use super::data::{
    AnalysisReport, Blueprint, FileAnalysis, GateReport, IngestReport, PlanOutcome, RiskReport,
};
use crate::audit::{
    build_report, AutonomousAuditor, ExecutiveInsights, ExecutiveReport, Forecast,
};
use crate::common::CancellationToken;
use crate::comparison::{self, ComparisonResult};
use crate::config::FragmapConfig;
use crate::core::{metrics, FactRecord, NodeKind};
use crate::corpus::Corpus;
use crate::errors::{FragmapError, Result};
use crate::extraction::extract_files;
use crate::heuristics::{interpret, Interpretation};
use crate::io::FileWalker;
use crate::judgement::{assess, Judgement};
use crate::policy::{health_score, PolicyGuard, PolicyReport};
use crate::risk::{self, Classification, Git2History, NoHistory, RiskNode, RiskScorer, VersionHistory};
use crate::store::{now_ms, HistorySnapshot, Interaction, KnowledgeStore, PersistedAnalysis};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const TOP_FAN_IN: usize = 10;

/// Entry point for every pipeline operation.
///
/// Owns the session corpus and, when available, the persistent store.
/// Store failures never fail an operation: the engine drops back to
/// in-memory operation and reports a warning on the result.
pub struct Engine {
    config: FragmapConfig,
    corpus: Corpus,
    store: Option<KnowledgeStore>,
    history: Option<Arc<dyn VersionHistory>>,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(config: FragmapConfig) -> Self {
        Self {
            config,
            corpus: Corpus::new(),
            store: None,
            history: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_store(mut self, store: KnowledgeStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a fixed history provider instead of git discovery on the ingestion root
    pub fn with_history(mut self, history: Arc<dyn VersionHistory>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn config(&self) -> &FragmapConfig {
        &self.config
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn store(&self) -> Option<&KnowledgeStore> {
        self.store.as_ref()
    }

    /// Token that stops an ingestion in progress
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drop every held record and the graph
    pub fn clear(&mut self) {
        self.corpus.clear();
    }

    /// Open the configured store relative to `root`, unless one is already open
    /// or persistence is disabled. Failure leaves the engine in-memory only.
    pub fn open_store(&mut self, root: &Path) -> Option<String> {
        if self.store.is_some() || !self.config.store.enabled {
            return None;
        }
        let path = self.config.store.resolve(root);
        match KnowledgeStore::open(&path) {
            Ok(store) => {
                self.store = Some(store);
                None
            }
            Err(e) => {
                log::warn!("Continuing without persistence: {}", e);
                Some(format!("Store unavailable ({}); results are not persisted", e))
            }
        }
    }

    /// Walk and extract every path, merging the records into the corpus.
    pub fn ingest(&mut self, paths: &[PathBuf]) -> Result<IngestReport> {
        let mut report = IngestReport {
            roots: Vec::new(),
            files_scanned: 0,
            total_loc: 0,
            updated_baseline: self.corpus.baseline(),
            unreadable: Vec::new(),
            cancelled: false,
            warnings: Vec::new(),
        };

        for path in paths {
            let files = FileWalker::new(path.clone())
                .with_extensions(self.config.ingest.extensions.clone())
                .with_exclude_dirs(self.config.ingest.exclude_dirs.clone())
                .walk()?;

            let root = if path.is_file() {
                path.parent().map(Path::to_path_buf).unwrap_or_default()
            } else {
                path.clone()
            };
            if self.corpus.root().is_none() {
                self.corpus.set_root(root.clone());
            }
            if let Some(warning) = self.open_store(&root) {
                report.warnings.push(warning);
            }

            let batch = extract_files(&files, &self.cancel);
            report.total_loc += batch.records.iter().map(|r| r.loc).sum::<usize>();
            report.cancelled |= batch.was_cancelled();
            report.unreadable.extend(batch.unreadable.iter().cloned());
            report.files_scanned += self.corpus.merge(batch);
            report.roots.push(root);

            if report.cancelled {
                log::info!("Ingestion cancelled after {} files", report.files_scanned);
                break;
            }
        }

        report.updated_baseline = self.corpus.baseline();
        log::info!(
            "Ingested {} files ({} lines), baseline complexity {:.1}",
            report.files_scanned,
            report.total_loc,
            report.updated_baseline.avg_complexity
        );

        let target = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.log_interaction(
            "ingest",
            &target,
            format!("{} files, {} lines", report.files_scanned, report.total_loc),
            &mut report.warnings,
        );
        Ok(report)
    }

    /// Interpret and judge one record against the current baseline
    pub fn assess_record(&self, record: &FactRecord) -> (Interpretation, Judgement) {
        let interpretation = interpret(record, &self.corpus.baseline());
        let judgement = assess(&interpretation);
        (interpretation, judgement)
    }

    pub fn analyze(&mut self, scope: &str) -> Result<AnalysisReport> {
        let baseline = self.corpus.baseline();
        let mut warnings = Vec::new();
        if self.corpus.is_empty() {
            warnings.push("No ingested files; run ingest first".to_string());
        }

        let nodes = self.risk_pass(scope, &mut warnings);
        let policy = self.check_policy(scope);

        let mut per_file = Vec::new();
        let mut smells = Vec::new();
        let mut persisted = Vec::new();
        let timestamp = now_ms();

        for record in self.corpus.select(scope) {
            let interpretation = interpret(record, &baseline);
            let judgement = assess(&interpretation);
            let node = nodes.get(&record.source);

            smells.extend(
                interpretation
                    .smells
                    .iter()
                    .map(|smell| format!("{}: {}", record.source, smell)),
            );

            let file_violations: Vec<_> = policy
                .violations
                .iter()
                .filter(|v| v.target == record.source)
                .cloned()
                .collect();

            persisted.push((
                PersistedAnalysis {
                    source: record.source.clone(),
                    loc: record.loc,
                    complexity: interpretation.complexity_score,
                    class_count: record.classes.len(),
                    function_count: record.functions.len(),
                    role: interpretation.role,
                    health_score: health_score(&file_violations),
                    risk_score: node.map(|n| n.total_risk_score),
                    updated_ms: timestamp,
                },
                node.cloned(),
            ));

            per_file.push(FileAnalysis {
                source: record.source.clone(),
                role: interpretation.role,
                judgement_summary: judgement.summary,
                relative_complexity: interpretation.relative_complexity,
                confidence: judgement.confidence,
                risk_score: node.map_or(0.0, |n| n.total_risk_score),
                classification: node.map_or(Classification::Green, |n| n.classification),
            });
        }

        self.persist(&persisted, timestamp, &mut warnings);

        let summary = format!(
            "{} files, health {:.0}, {} smells",
            per_file.len(),
            policy.health_score,
            smells.len()
        );
        self.log_interaction("analyze", scope, summary, &mut warnings);

        Ok(AnalysisReport {
            per_file,
            smells,
            health_score: policy.health_score,
            baseline,
            warnings,
        })
    }

    fn persist(
        &mut self,
        rows: &[(PersistedAnalysis, Option<RiskNode>)],
        timestamp: u64,
        warnings: &mut Vec<String>,
    ) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let result: Result<()> = rows.iter().try_for_each(|(analysis, node)| {
            store.save_analysis(analysis)?;
            store.append_history(
                &analysis.source,
                &HistorySnapshot {
                    timestamp_ms: timestamp,
                    loc: analysis.loc,
                    complexity: analysis.complexity,
                    health_score: analysis.health_score,
                },
            )?;
            if let Some(node) = node {
                store.append_risk_snapshot(node, timestamp)?;
            }
            Ok(())
        });

        if let Err(e) = result {
            log::warn!("Persisting analysis failed, continuing in-memory: {}", e);
            warnings.push(format!("Degraded: analysis not persisted ({})", e));
            self.store = None;
        }
    }

    fn history_provider(&self) -> Arc<dyn VersionHistory> {
        match (&self.history, self.corpus.root()) {
            (Some(history), _) => Arc::clone(history),
            (None, Some(root)) => Arc::new(Git2History::new(root)),
            (None, None) => Arc::new(NoHistory),
        }
    }

    /// Score the whole corpus and keep the nodes inside `scope`.
    ///
    /// Normalization always spans the full corpus so a node's score does not
    /// depend on the scope it was requested with.
    fn risk_pass(&self, scope: &str, warnings: &mut Vec<String>) -> BTreeMap<String, RiskNode> {
        let (activity, error) = risk::activity_or_empty(
            self.history_provider(),
            self.config.risk.window_days,
            Duration::from_millis(self.config.risk.history_timeout_ms),
        );
        if let Some(e) = error {
            warnings.push(format!("{}; volatility and knowledge risk set to 0", e));
        }

        let scorer = RiskScorer::new(self.config.risk.weights);
        let mut nodes = scorer.score(self.corpus.records(), self.corpus.graph(), &activity);
        let selected: Vec<String> = self
            .corpus
            .select(scope)
            .iter()
            .map(|r| r.source.clone())
            .collect();
        nodes.retain(|source, _| selected.contains(source));
        nodes
    }

    pub fn score_risk(&mut self, scope: &str) -> Result<RiskReport> {
        let mut warnings = Vec::new();
        let nodes = self.risk_pass(scope, &mut warnings);
        let history_available = warnings.is_empty();

        let red = nodes
            .values()
            .filter(|n| n.classification == Classification::Red)
            .count();
        self.log_interaction(
            "score_risk",
            scope,
            format!("{} nodes, {} red", nodes.len(), red),
            &mut warnings,
        );

        Ok(RiskReport {
            nodes,
            history_available,
            warnings,
        })
    }

    pub fn check_policy(&self, scope: &str) -> PolicyReport {
        let records = self.corpus.select(scope);
        let edges: Vec<_> = self
            .corpus
            .graph()
            .edges()
            .iter()
            .filter(|e| records.iter().any(|r| r.source == e.source))
            .cloned()
            .collect();
        PolicyGuard::new(self.config.policy.clone()).check(records, &edges)
    }

    pub fn get_forecast(&mut self, source: &str) -> Result<Forecast> {
        let source = self
            .corpus
            .resolve(source)
            .map_or_else(|| source.to_string(), |r| r.source.clone());

        let forecast = match self.store.as_ref() {
            Some(store) => AutonomousAuditor::new(store, self.config.audit.clone()).forecast(&source)?,
            None => Forecast::neutral(&source, self.config.audit.horizon),
        };

        let mut warnings = Vec::new();
        self.log_interaction(
            "forecast",
            &source,
            format!("velocity {:.2}, trend {}", forecast.velocity, forecast.trend),
            &mut warnings,
        );
        Ok(forecast)
    }

    fn resolve(&self, target: &str) -> Result<&FactRecord> {
        self.corpus
            .resolve(target)
            .ok_or_else(|| FragmapError::PathNotFound(PathBuf::from(target)))
    }

    pub fn compare(&mut self, a: &str, b: &str) -> Result<ComparisonResult> {
        let result = comparison::compare(self.resolve(a)?, self.resolve(b)?);
        let mut warnings = Vec::new();
        self.log_interaction(
            "compare",
            &format!("{} vs {}", a, b),
            result.rationale.clone(),
            &mut warnings,
        );
        Ok(result)
    }

    pub fn plan_refactor(&mut self, target: &str) -> Result<PlanOutcome> {
        let record = self.resolve(target)?;
        let (_, judgement) = self.assess_record(record);
        let source = record.source.clone();

        let message = match &judgement.refactor_plan {
            Some(plan) => format!("{} steps planned", plan.steps.len()),
            None => "No refactor necessary.".to_string(),
        };
        let mut warnings = Vec::new();
        self.log_interaction("plan_refactor", &source, message.clone(), &mut warnings);

        Ok(PlanOutcome {
            source,
            plan: judgement.refactor_plan,
            confidence: judgement.confidence,
            message,
        })
    }

    pub fn blueprint(&self) -> Blueprint {
        let graph = self.corpus.graph();
        let baseline = self.corpus.baseline();
        let mut roles = BTreeMap::new();
        for record in self.corpus.records() {
            *roles.entry(interpret(record, &baseline).role).or_insert(0) += 1;
        }

        Blueprint {
            files: graph.node_count_by_kind(NodeKind::File),
            functions: graph.node_count_by_kind(NodeKind::Function),
            classes: graph.node_count_by_kind(NodeKind::Class),
            edges: graph.edges().len(),
            top_fan_in: graph.top_fan_in(TOP_FAN_IN),
            roles,
        }
    }

    /// Executive summary from the store, or from the live corpus when no store
    /// is open
    pub fn insights(&mut self) -> Result<ExecutiveReport> {
        let mut warnings = Vec::new();
        let nodes = self.risk_pass("", &mut warnings);

        let report = match self.store.as_ref() {
            Some(store) => ExecutiveInsights::new(store).generate_report(Some(&nodes))?,
            None => build_report(&self.in_memory_analyses(), Some(&nodes)),
        };

        self.log_interaction(
            "insights",
            "",
            format!(
                "{} units, {}",
                report.metrics.total_structural_units,
                report.verdict.label()
            ),
            &mut warnings,
        );
        Ok(report)
    }

    fn in_memory_analyses(&self) -> Vec<PersistedAnalysis> {
        let baseline = self.corpus.baseline();
        self.corpus
            .records()
            .map(|record| {
                let interpretation = interpret(record, &baseline);
                PersistedAnalysis {
                    source: record.source.clone(),
                    loc: record.loc,
                    complexity: f64::from(metrics::raw_complexity(record)),
                    class_count: record.classes.len(),
                    function_count: record.functions.len(),
                    role: interpretation.role,
                    health_score: 100.0,
                    risk_score: None,
                    updated_ms: 0,
                }
            })
            .collect()
    }

    /// Proactive warning about the worst stored offender, if any
    pub fn proactive_alert(&self, health_score: f64) -> Result<Option<String>> {
        match self.store.as_ref() {
            Some(store) => {
                AutonomousAuditor::new(store, self.config.audit.clone()).proactive_alert(health_score)
            }
            None => Ok(None),
        }
    }

    /// CI gate: fails when any node is RED or policy health is below the floor
    pub fn gate(&mut self, shadow: bool) -> Result<GateReport> {
        let mut warnings = Vec::new();
        let nodes = self.risk_pass("", &mut warnings);
        let policy = self.check_policy("");

        let red_nodes: Vec<RiskNode> = risk::nodes_in(&nodes, Classification::Red)
            .into_iter()
            .cloned()
            .collect();
        let min_health = self.config.policy.min_health;
        let passed = red_nodes.is_empty() && policy.health_score >= min_health;

        let verdict = if passed { "pass" } else { "fail" };
        self.log_interaction(
            "gate",
            if shadow { "shadow" } else { "mandatory" },
            format!("{} ({} red, health {:.0})", verdict, red_nodes.len(), policy.health_score),
            &mut warnings,
        );

        Ok(GateReport {
            red_nodes,
            health_score: policy.health_score,
            min_health,
            passed,
            shadow,
            warnings,
        })
    }

    pub fn recall(&self, keyword: &str) -> Result<Vec<Interaction>> {
        match self.store.as_ref() {
            Some(store) => store.recall(keyword),
            None => Ok(Vec::new()),
        }
    }

    fn log_interaction(
        &mut self,
        operation: &str,
        target: &str,
        summary: String,
        warnings: &mut Vec<String>,
    ) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if let Err(e) = store.log_interaction(&Interaction::new(operation, target, summary)) {
            log::warn!("Interaction log unavailable, continuing in-memory: {}", e);
            warnings.push(format!("Degraded: interaction not logged ({})", e));
            self.store = None;
        }
    }
}
