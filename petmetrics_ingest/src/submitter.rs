//! Sends batches to the store and classifies the result.
use std::sync::Arc;

use petmetrics_observability::KeyValue;
use petmetrics_store::{Record, RejectedRecord, StoreError, TableName, TimeSeriesStore};
use tracing::{debug, error, warn};

use crate::metrics::IngestMetrics;

/// What happened to a submitted batch.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// Every record was stored.
    Accepted { ingested: u64 },
    /// The store kept `ingested` records and refused the others.
    PartiallyRejected {
        ingested: u64,
        rejected: Vec<RecordRejection>,
    },
    /// The whole request failed. Nothing was stored.
    Failed { error: StoreError },
}

impl BatchOutcome {
    pub fn ingested(&self) -> u64 {
        match self {
            BatchOutcome::Accepted { ingested }
            | BatchOutcome::PartiallyRejected { ingested, .. } => *ingested,
            BatchOutcome::Failed { .. } => 0,
        }
    }

    pub fn rejected(&self) -> u64 {
        match self {
            BatchOutcome::PartiallyRejected { rejected, .. } => rejected.len() as u64,
            _ => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchOutcome::Failed { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            BatchOutcome::Accepted { .. } => "accepted",
            BatchOutcome::PartiallyRejected { .. } => "partially_rejected",
            BatchOutcome::Failed { .. } => "failed",
        }
    }
}

/// A record the store refused, paired with the reason it gave.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRejection {
    pub rejection: RejectedRecord,
    /// `None` when the store reported an index outside the batch.
    pub record: Option<Record>,
}

impl RecordRejection {
    fn new(rejection: RejectedRecord, records: &[Record]) -> Self {
        let record = records.get(rejection.record_index).cloned();
        Self { rejection, record }
    }
}

/// Writes one batch per call. Batches are never retried.
#[derive(Clone)]
pub struct BatchSubmitter {
    store: Arc<dyn TimeSeriesStore>,
    table: TableName,
    metrics: IngestMetrics,
}

impl BatchSubmitter {
    pub fn new(store: Arc<dyn TimeSeriesStore>, table: TableName) -> Self {
        Self {
            store,
            table,
            metrics: IngestMetrics::default(),
        }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Submit `records` as a single write request.
    ///
    /// Failures are logged and returned as [`BatchOutcome::Failed`], they
    /// never abort the caller.
    pub async fn submit(&self, batch_index: u64, records: Vec<Record>) -> BatchOutcome {
        let attempted = records.len() as u64;

        let outcome = match self.store.write_records(self.table.clone(), &records).await {
            Ok(outcome) if outcome.is_fully_accepted() => {
                debug!(
                    batch = batch_index,
                    ingested = outcome.records_ingested.total,
                    memory_store = outcome.records_ingested.memory_store,
                    magnetic_store = outcome.records_ingested.magnetic_store,
                    "Batch accepted"
                );
                BatchOutcome::Accepted {
                    ingested: u64::from(outcome.records_ingested.total),
                }
            }
            Ok(outcome) => {
                warn!(
                    batch = batch_index,
                    ingested = outcome.records_ingested.total,
                    rejected = outcome.rejected.len(),
                    "Batch partially rejected"
                );
                let rejected: Vec<_> = outcome
                    .rejected
                    .into_iter()
                    .map(|rejection| RecordRejection::new(rejection, &records))
                    .collect();
                for rejection in &rejected {
                    log_rejection(batch_index, rejection);
                }
                BatchOutcome::PartiallyRejected {
                    ingested: u64::from(outcome.records_ingested.total),
                    rejected,
                }
            }
            Err(err) => {
                error!(
                    batch = batch_index,
                    records = attempted,
                    kind = ?err.kind(),
                    error = %err,
                    "Batch failed"
                );
                BatchOutcome::Failed { error: err }
            }
        };

        let attributes = [
            KeyValue::new("table", self.table.id().to_string()),
            KeyValue::new("outcome", outcome.label()),
        ];
        self.metrics.batches.add(1, &attributes);
        self.metrics.records_attempted.add(attempted, &attributes);
        self.metrics
            .records_ingested
            .add(outcome.ingested(), &attributes);
        self.metrics
            .records_rejected
            .add(outcome.rejected(), &attributes);

        outcome
    }
}

impl std::fmt::Debug for BatchSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchSubmitter")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

fn log_rejection(batch_index: u64, rejection: &RecordRejection) {
    let rejected = &rejection.rejection;
    let Some(record) = &rejection.record else {
        warn!(
            batch = batch_index,
            record_index = rejected.record_index,
            reason = %rejected.reason,
            "Rejected record"
        );
        return;
    };

    let dimensions = record
        .dimensions
        .iter()
        .map(|dimension| format!("{}={}", dimension.name, dimension.value))
        .collect::<Vec<_>>()
        .join(",");

    warn!(
        batch = batch_index,
        record_index = rejected.record_index,
        dimensions = %dimensions,
        measure = %record.measure_name,
        value = %record.measure_value,
        time = %record.time,
        existing_version = ?rejected.existing_version,
        reason = %rejected.reason,
        "Rejected record"
    );
}
