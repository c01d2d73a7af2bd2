//! Batch runner: per-case extraction and classification, then the ledger fold.
//!
//! Per-case work has no shared mutable state, so cases can be sharded across
//! scoped worker threads. Each worker keeps its own partial ledger builders;
//! partials are merged sequentially in shard order once every worker is done,
//! which makes a multi-worker run produce exactly what a single-worker run
//! produces.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use flowledger_core::{ConfigResult, DataQualityIssue, RunId, Warning};
use flowledger_ledger::{SiteLedgerBuilder, WarehouseLedgerBuilder};
use flowledger_routing::{
    CaseRecord, EventExtractor, FlowClassification, FlowClassifier, FlowSummary, ValidatedConfig,
};
use flowledger_validation::{BalanceValidator, GLOBAL_LOCATION};

use crate::config::EngineConfig;
use crate::report::{RunReport, RunStatus};

/// Partial results of one worker.
#[derive(Debug, Default)]
struct Shard {
    classifications: Vec<FlowClassification>,
    warnings: Vec<Warning>,
    warehouses: WarehouseLedgerBuilder,
    sites: SiteLedgerBuilder,
    summary: FlowSummary,
    processed: usize,
}

impl Shard {
    fn merge(&mut self, other: Shard) {
        self.classifications.extend(other.classifications);
        self.warnings.extend(other.warnings);
        self.warehouses.merge(other.warehouses);
        self.sites.merge(other.sites);
        self.summary.merge(&other.summary);
        self.processed += other.processed;
    }
}

/// Classifies cases and builds the warehouse/site ledgers for one batch.
#[derive(Debug, Clone)]
pub struct FlowEngine {
    config: Arc<ValidatedConfig>,
    extractor: EventExtractor,
    classifier: FlowClassifier,
    validator: BalanceValidator,
    settings: EngineConfig,
}

impl FlowEngine {
    /// Fails only on invalid engine settings; the location config is already
    /// validated by construction.
    pub fn new(config: ValidatedConfig, settings: EngineConfig) -> ConfigResult<Self> {
        settings.validate()?;
        let validator = BalanceValidator::new(settings.balance_tolerance)?;
        let config = Arc::new(config);

        Ok(Self {
            extractor: EventExtractor::new(Arc::clone(&config)),
            classifier: FlowClassifier::new(),
            config,
            validator,
            settings,
        })
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    /// Process one batch. Never fails: problems surface as report warnings.
    pub fn run(&self, records: &[CaseRecord]) -> RunReport {
        let run_id = RunId::new();
        let _span = info_span!("flowledger.run", run_id = %run_id).entered();
        let deadline = self.settings.deadline.map(|d| Instant::now() + d);

        let (cases, mut warnings) = dedupe(records);
        let total = cases.len();

        let mut merged = Shard::default();
        for shard in self.process_sharded(&cases, deadline) {
            merged.merge(shard);
        }

        merged
            .classifications
            .sort_by(|a, b| a.case_id.cmp(&b.case_id));
        warnings.append(&mut merged.warnings);

        let span = merged.warehouses.span().union(merged.sites.span());
        let warehouse_ledger = merged.warehouses.finish(&self.config, span);
        let site_ledger = merged.sites.finish(&self.config, span);
        warnings.extend(self.validator.validate(&warehouse_ledger, &site_ledger));

        let status = if merged.processed < total {
            warn!(processed = merged.processed, total, "deadline reached; returning partial result");
            RunStatus::PartialResult {
                processed: merged.processed,
                total,
            }
        } else {
            RunStatus::Complete
        };

        info!(
            cases = total,
            processed = merged.processed,
            warnings = warnings.len(),
            periods = span.periods().count(),
            "run finished"
        );

        RunReport {
            run_id,
            status,
            classifications: merged.classifications,
            summary: merged.summary,
            warehouse_ledger,
            site_ledger,
            warnings,
        }
    }

    fn process_sharded(&self, cases: &[&CaseRecord], deadline: Option<Instant>) -> Vec<Shard> {
        let workers = self.settings.workers.min(cases.len()).max(1);
        if workers == 1 {
            return vec![self.process_shard(cases, deadline)];
        }

        let chunk_size = cases.len().div_ceil(workers);
        debug!(workers, chunk_size, "sharding cases across workers");

        thread::scope(|scope| {
            let handles: Vec<_> = cases
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || self.process_shard(chunk, deadline)))
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        })
    }

    fn process_shard(&self, cases: &[&CaseRecord], deadline: Option<Instant>) -> Shard {
        let mut shard = Shard::default();

        for record in cases {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }

            let extraction = self.extractor.extract(record);
            let classification = self
                .classifier
                .classify(&record.case_id, &extraction.events);

            shard.warehouses.record_case(&extraction.events);
            shard.sites.record_case(&classification, &extraction.events);
            shard.summary.record(&classification, record.package_count);
            shard.warnings.extend(extraction.warnings);
            shard.classifications.push(classification);
            shard.processed += 1;
        }

        shard
    }
}

/// Keep the first record per case id; later duplicates become warnings.
fn dedupe(records: &[CaseRecord]) -> (Vec<&CaseRecord>, Vec<Warning>) {
    let mut seen = HashSet::new();
    let mut cases = Vec::with_capacity(records.len());
    let mut warnings = Vec::new();

    for record in records {
        if seen.insert(&record.case_id) {
            cases.push(record);
        } else {
            warn!(case_id = %record.case_id, "duplicate case id skipped");
            warnings.push(Warning::data_quality(
                record.case_id.clone(),
                GLOBAL_LOCATION,
                DataQualityIssue::DuplicateCase,
                format!("duplicate record for case {}; first occurrence kept", record.case_id),
            ));
        }
    }

    (cases, warnings)
}
