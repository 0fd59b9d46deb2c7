//! Main Pipeline struct and public API.
//!
//! A run cycles Detection → Correction → Enrichment until detection finds
//! nothing, correction leaves nothing to enrich, or the iteration cap is
//! reached. The dataset is moved into each stage and handed back, so no
//! stage holds on to it between calls.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info_span;

use crate::audit::{AuditLog, Stage};
use crate::config::PipelineConfig;
use crate::correction::CorrectionEngine;
use crate::dataset::{Dataset, ISSUES_COLUMN};
use crate::detection::{DetectionEngine, DetectionLog};
use crate::enrichment::Enricher;
use crate::error::{CleanroomError, Result};
use crate::input::{write_dataset, Parser, SourceMetadata};
use crate::llm::LlmProvider;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Detection found no issues.
    Clean,
    /// Correction left no missing values, so enrichment was not needed.
    Corrected,
    /// The final detection at the iteration cap found no issues.
    Resolved,
    /// The iteration cap was reached with issues outstanding.
    Unresolved,
}

impl RunStatus {
    /// Whether every detected issue was dealt with.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, RunStatus::Unresolved)
    }
}

/// A record still carrying issues when the run stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedRow {
    pub row: usize,
    pub issues: String,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    /// The cleaned dataset. Keeps its issues column only when unresolved.
    #[serde(skip)]
    pub dataset: Dataset,
    pub status: RunStatus,
    /// Iterations started (never more than the configured cap).
    pub iterations: usize,
    /// Detection passes run, including the final one at the cap.
    pub detection_runs: usize,
    /// Enrichment attempts whose response was adopted.
    pub enrichments_applied: usize,
    pub unresolved: Vec<UnresolvedRow>,
    /// Metadata about the input file, for file runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    #[serde(skip)]
    pub audit: AuditLog,
}

impl PipelineOutcome {
    /// Append the audit trail to a log file.
    pub fn write_log(&self, path: impl AsRef<Path>) -> Result<()> {
        self.audit.append_to_file(path)
    }
}

/// A run stopped by a fatal error.
///
/// Carries every audit entry recorded before the failure, ending with an
/// error entry that spells out the full cause chain.
#[derive(Debug)]
pub struct RunFailure {
    pub error: CleanroomError,
    pub audit: AuditLog,
}

impl RunFailure {
    fn new(error: CleanroomError, mut audit: AuditLog) -> Self {
        audit.error(
            Stage::Pipeline,
            format!("Run failed: {}", error_chain(&error)),
        );
        Self { error, audit }
    }

    /// Append the partial audit trail to a log file.
    pub fn write_log(&self, path: impl AsRef<Path>) -> Result<()> {
        self.audit.append_to_file(path)
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl StdError for RunFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}

impl From<RunFailure> for CleanroomError {
    fn from(failure: RunFailure) -> Self {
        failure.error
    }
}

/// Result of a pipeline run.
pub type RunResult = std::result::Result<PipelineOutcome, RunFailure>;

/// An error message followed by each underlying cause not already part of it.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Where the cycle stopped, before the audit trail is attached.
struct Settled {
    dataset: Dataset,
    status: RunStatus,
    iterations: usize,
    detection_runs: usize,
    enrichments_applied: usize,
    unresolved: Vec<UnresolvedRow>,
}

impl Settled {
    fn into_outcome(self, audit: AuditLog) -> PipelineOutcome {
        PipelineOutcome {
            dataset: self.dataset,
            status: self.status,
            iterations: self.iterations,
            detection_runs: self.detection_runs,
            enrichments_applied: self.enrichments_applied,
            unresolved: self.unresolved,
            source: None,
            audit,
        }
    }
}

/// The iterative cleaning pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    detection: DetectionEngine,
    correction: CorrectionEngine,
    enricher: Enricher,
    llm_provider: Option<Arc<dyn LlmProvider>>,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        let detection = DetectionEngine::new(&config.vocabularies);
        let correction = CorrectionEngine::new(&config);

        Self {
            config,
            detection,
            correction,
            enricher: Enricher::new(),
            llm_provider: None,
        }
    }

    /// Add an LLM provider for the enrichment stage.
    ///
    /// Without one, enrichment is logged as skipped and the run relies on
    /// detection and correction alone.
    pub fn with_llm(self, provider: impl LlmProvider + 'static) -> Self {
        self.with_shared_llm(Arc::new(provider))
    }

    /// Add an LLM provider that is also held elsewhere.
    pub fn with_shared_llm(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.llm_provider = Some(provider);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Detect issues without correcting anything.
    pub fn detect(&self, dataset: Dataset) -> (Dataset, DetectionLog) {
        self.detection.detect(dataset)
    }

    /// Run the full cycle on an in-memory dataset.
    ///
    /// On a fatal error the returned [`RunFailure`] holds the audit trail
    /// recorded up to that point.
    pub fn run(&self, dataset: Dataset) -> RunResult {
        self.run_audited(dataset, AuditLog::new())
    }

    fn run_audited(&self, dataset: Dataset, mut audit: AuditLog) -> RunResult {
        match self.cycle(dataset, &mut audit) {
            Ok(settled) => Ok(settled.into_outcome(audit)),
            Err(error) => Err(RunFailure::new(error, audit)),
        }
    }

    fn cycle(&self, dataset: Dataset, audit: &mut AuditLog) -> Result<Settled> {
        self.config.validate()?;

        let max_iterations = self.config.max_iterations;
        audit.info(
            Stage::Pipeline,
            format!(
                "Starting run on {} rows and {} columns (max {} iterations, enrichment: {}).",
                dataset.row_count(),
                dataset.column_count(),
                max_iterations,
                self.llm_provider
                    .as_ref()
                    .map(|p| p.name())
                    .unwrap_or("none")
            ),
        );

        let mut dataset = dataset;
        let mut detection_runs = 0;
        let mut enrichments_applied = 0;
        let mut iteration = 0;

        loop {
            iteration += 1;
            let _span = info_span!("iteration", n = iteration).entered();
            audit.info(
                Stage::Pipeline,
                format!("Iteration {} of {}.", iteration, max_iterations),
            );

            let (detected, detection_log) = self.detection.detect(dataset);
            detection_runs += 1;
            detection_log.record_to(audit);

            if !detection_log.has_issues() {
                let mut clean = detected;
                clean.drop_column(ISSUES_COLUMN);
                audit.info(Stage::Pipeline, "No issues detected. Run complete.");
                return Ok(Settled {
                    dataset: clean,
                    status: RunStatus::Clean,
                    iterations: iteration,
                    detection_runs,
                    enrichments_applied,
                    unresolved: Vec::new(),
                });
            }

            let (corrected, correction_log) = self.correction.correct(detected)?;
            correction_log.record_to(audit);

            if !corrected.has_missing_like(Some(ISSUES_COLUMN)) {
                audit.info(
                    Stage::Pipeline,
                    "No missing values after correction; enrichment not needed. Run complete.",
                );
                return Ok(Settled {
                    dataset: corrected,
                    status: RunStatus::Corrected,
                    iterations: iteration,
                    detection_runs,
                    enrichments_applied,
                    unresolved: Vec::new(),
                });
            }

            let (enriched, enrichment_log) = self
                .enricher
                .enrich(corrected, self.llm_provider.as_deref());
            enrichment_log.record_to(audit);
            if enrichment_log.applied() {
                enrichments_applied += 1;
            }
            dataset = enriched;

            if iteration >= max_iterations {
                let (detected, detection_log) = self.detection.detect(dataset);
                detection_runs += 1;
                detection_log.record_to(audit);

                let (dataset, status, unresolved) = finalize(detected, &detection_log, audit);
                return Ok(Settled {
                    dataset,
                    status,
                    iterations: iteration,
                    detection_runs,
                    enrichments_applied,
                    unresolved,
                });
            }
        }
    }

    /// Load `input`, run the pipeline, and write the cleaned dataset to
    /// `output`. Nothing is written when the run fails.
    pub fn run_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> RunResult {
        let parser = Parser::with_config(self.config.parser.clone());
        let (dataset, source) = parser
            .parse_file(input)
            .map_err(|e| RunFailure::new(e, AuditLog::new()))?;

        let mut audit = AuditLog::new();
        audit.info(Stage::Pipeline, source.summary());

        let mut outcome = self.run_audited(dataset, audit)?;
        if let Err(e) = write_dataset(&outcome.dataset, output.as_ref()) {
            return Err(RunFailure::new(e, outcome.audit));
        }
        outcome.audit.info(
            Stage::Pipeline,
            format!("Cleaned data written to {}.", output.as_ref().display()),
        );
        outcome.source = Some(source);
        Ok(outcome)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Settle the final detection at the iteration cap.
fn finalize(
    mut dataset: Dataset,
    log: &DetectionLog,
    audit: &mut AuditLog,
) -> (Dataset, RunStatus, Vec<UnresolvedRow>) {
    if !log.has_issues() {
        dataset.drop_column(ISSUES_COLUMN);
        audit.info(Stage::Pipeline, "All issues resolved. Run complete.");
        return (dataset, RunStatus::Resolved, Vec::new());
    }

    let unresolved: Vec<UnresolvedRow> = dataset
        .column_by_name(ISSUES_COLUMN)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(row, cell)| UnresolvedRow {
            row,
            issues: cell.render(),
        })
        .filter(|u| !u.issues.is_empty())
        .collect();

    audit.warn(
        Stage::Pipeline,
        format!(
            "Maximum iterations reached with {} rows unresolved.",
            unresolved.len()
        ),
    );
    for row in &unresolved {
        audit.warn(
            Stage::Pipeline,
            format!("Row {} unresolved: {}", row.row, row.issues),
        );
    }
    (dataset, RunStatus::Unresolved, unresolved)
}
