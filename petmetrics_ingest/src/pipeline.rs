//! Drives generation and submission for a whole run.
use std::{ops::Range, sync::Arc, time::Instant};

use futures::{StreamExt, stream};
use petmetrics_store::{Record, TimeSeriesStore};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    config::IngestionConfig,
    entity::EntityPool,
    error::Result,
    generator::{MeasurementGenerator, RECORDS_PER_EVENT},
    submitter::{BatchOutcome, BatchSubmitter},
    timeline::Timeline,
};

/// Log progress every this many batches.
const PROGRESS_INTERVAL: u64 = 500;

/// Totals of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionSummary {
    pub steps: u64,
    pub batches_submitted: u64,
    pub batches_accepted: u64,
    pub batches_partially_rejected: u64,
    pub batches_failed: u64,
    pub records_attempted: u64,
    pub records_ingested: u64,
    pub records_rejected: u64,
    /// The run stopped before all batches were dispatched.
    pub cancelled: bool,
}

impl IngestionSummary {
    fn record(&mut self, steps: u64, attempted: u64, outcome: &BatchOutcome) {
        self.steps += steps;
        self.batches_submitted += 1;
        self.records_attempted += attempted;
        self.records_ingested += outcome.ingested();
        self.records_rejected += outcome.rejected();

        match outcome {
            BatchOutcome::Accepted { .. } => self.batches_accepted += 1,
            BatchOutcome::PartiallyRejected { .. } => self.batches_partially_rejected += 1,
            BatchOutcome::Failed { .. } => self.batches_failed += 1,
        }
    }
}

/// Generates events along the timeline and writes them in batches.
///
/// Events are generated strictly in step order from a single `Rng`. With a
/// `concurrency` above one, up to that many batches are in flight at once,
/// but each batch is still built and submitted as a whole.
pub struct IngestionPipeline<R> {
    config: IngestionConfig,
    timeline: Timeline,
    pool: EntityPool,
    generator: MeasurementGenerator,
    submitter: BatchSubmitter,
    rng: R,
}

impl<R: Rng + Send> IngestionPipeline<R> {
    pub fn new(config: IngestionConfig, store: Arc<dyn TimeSeriesStore>, rng: R) -> Result<Self> {
        config.validate()?;

        let timeline = Timeline::from_datetimes(config.start, config.end, config.total_steps)?;
        let pool = EntityPool::new(config.owners, config.dependents_per_owner)?;
        let submitter = BatchSubmitter::new(store, config.table.clone());

        Ok(Self {
            config,
            timeline,
            pool,
            generator: MeasurementGenerator::default(),
            submitter,
            rng,
        })
    }

    /// Replace the default measurement generator.
    pub fn with_generator(mut self, generator: MeasurementGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Run until every batch is submitted or `ct` is cancelled.
    ///
    /// Cancellation stops dispatching new batches. Batches already in flight
    /// are awaited.
    pub async fn run(self, ct: CancellationToken) -> Result<IngestionSummary> {
        let batch_size = self.config.batch_size_nonzero()?;
        let concurrency = self.config.concurrency_nonzero()?;

        let Self {
            config,
            timeline,
            pool,
            generator,
            submitter,
            mut rng,
        } = self;

        let total_batches = timeline.batch_count(batch_size);
        info!(
            table = %config.table,
            total_steps = config.total_steps,
            batch_size = config.batch_size,
            total_batches,
            increment_ms = timeline.increment().as_millis() as u64,
            concurrency = config.concurrency,
            "Starting ingestion"
        );

        let started_at = Instant::now();
        let submitter = &submitter;

        let batches = timeline
            .batches(batch_size)
            .enumerate()
            .map(|(index, steps)| {
                let records = build_batch(&timeline, &pool, &generator, &mut rng, steps.clone());
                (index as u64, steps, records)
            });

        let submissions = stream::iter(batches)
            .take_until(ct.cancelled())
            .map(move |(index, steps, records)| async move {
                let attempted = records.len() as u64;
                let outcome = submitter.submit(index, records).await;
                (steps.end - steps.start, attempted, outcome)
            })
            .buffered(concurrency.get());
        let mut submissions = std::pin::pin!(submissions);

        let mut summary = IngestionSummary::default();

        while let Some((steps, attempted, outcome)) = submissions.next().await {
            summary.record(steps, attempted, &outcome);

            if summary.batches_submitted % PROGRESS_INTERVAL == 0 {
                info!(
                    batches = summary.batches_submitted,
                    total_batches,
                    records_ingested = summary.records_ingested,
                    records_rejected = summary.records_rejected,
                    batches_failed = summary.batches_failed,
                    "Ingestion progress"
                );
            }
        }

        summary.cancelled = summary.batches_submitted < total_batches;

        info!(
            records_attempted = summary.records_attempted,
            records_ingested = summary.records_ingested,
            records_rejected = summary.records_rejected,
            batches_submitted = summary.batches_submitted,
            batches_failed = summary.batches_failed,
            cancelled = summary.cancelled,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Inserted {} records into {}",
            summary.records_attempted,
            config.table
        );

        Ok(summary)
    }
}

fn build_batch<R: Rng + ?Sized>(
    timeline: &Timeline,
    pool: &EntityPool,
    generator: &MeasurementGenerator,
    rng: &mut R,
    steps: Range<u64>,
) -> Vec<Record> {
    let mut records = Vec::with_capacity((steps.end - steps.start) as usize * RECORDS_PER_EVENT);

    for step in steps {
        let entity = pool.choose(rng);
        records.extend(generator.generate(rng, &entity, timeline.timestamp_at(step)));
    }

    records
}

#[cfg(test)]
mod tests {
    use petmetrics_store::Timestamp;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::submitter::RecordRejection;

    #[test]
    fn test_build_batch_orders_events() {
        let timeline = Timeline::new(Timestamp::from_nanos(0), Timestamp::from_nanos(1_000), 10)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let records = build_batch(
            &timeline,
            &EntityPool::default(),
            &MeasurementGenerator::default(),
            &mut rng,
            4..7,
        );

        assert_eq!(records.len(), 6);
        let times: Vec<u64> = records.iter().map(|record| record.time.as_nanos()).collect();
        assert_eq!(times, vec![400, 401, 500, 501, 600, 601]);
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let mut summary = IngestionSummary::default();
        summary.record(25, 50, &BatchOutcome::Accepted { ingested: 50 });
        summary.record(
            25,
            50,
            &BatchOutcome::PartiallyRejected {
                ingested: 49,
                rejected: vec![RecordRejection {
                    rejection: petmetrics_store::RejectedRecord {
                        record_index: 0,
                        reason: "duplicate".to_string(),
                        existing_version: Some(1),
                    },
                    record: None,
                }],
            },
        );
        summary.record(
            1,
            2,
            &BatchOutcome::Failed {
                error: petmetrics_store::StoreError::Unavailable {
                    message: "down".to_string(),
                },
            },
        );

        assert_eq!(summary.steps, 51);
        assert_eq!(summary.batches_submitted, 3);
        assert_eq!(summary.batches_accepted, 1);
        assert_eq!(summary.batches_partially_rejected, 1);
        assert_eq!(summary.batches_failed, 1);
        assert_eq!(summary.records_attempted, 102);
        assert_eq!(summary.records_ingested, 99);
        assert_eq!(summary.records_rejected, 1);
    }
}
