use std::sync::Arc;

use petmetrics_ingest::{IngestionConfig, IngestionPipeline, IngestionSummary};
use petmetrics_store::{MeasureValue, TimeSeriesStore};
use tokio_util::sync::CancellationToken;

mod common;

use common::{FaultyStore, fixed_clock_store, provision, small_config};

async fn run(store: Arc<dyn TimeSeriesStore>, config: IngestionConfig) -> IngestionSummary {
    provision(store.as_ref(), &config.table).await;
    let rng = config.rng();
    IngestionPipeline::new(config, store, rng)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_default_run_ingests_every_record() {
    let store = Arc::new(fixed_clock_store());
    let config = IngestionConfig {
        seed: Some(7),
        ..Default::default()
    };
    let table = config.table.clone();

    let summary = run(store.clone(), config).await;

    assert_eq!(summary.steps, 100_000);
    assert_eq!(summary.batches_submitted, 4000);
    assert_eq!(summary.batches_accepted, 4000);
    assert_eq!(summary.records_attempted, 200_000);
    assert_eq!(summary.records_ingested, 200_000);
    assert_eq!(summary.records_rejected, 0);
    assert!(!summary.cancelled);
    assert_eq!(store.record_count(&table).await.unwrap(), 200_000);
}

#[tokio::test]
async fn test_last_batch_holds_remainder() {
    let store = Arc::new(FaultyStore::new());

    let summary = run(store.clone(), small_config(101, 25)).await;

    assert_eq!(summary.batches_submitted, 5);
    let sizes: Vec<usize> = store.writes().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![50, 50, 50, 50, 2]);
}

#[tokio::test]
async fn test_event_records_are_paired_and_ordered() {
    let store = Arc::new(FaultyStore::new());

    run(store.clone(), small_config(250, 25)).await;

    let records: Vec<_> = store.writes().into_iter().flatten().collect();
    assert_eq!(records.len(), 500);

    for pair in records.chunks(2) {
        let [weight, visits] = pair else {
            panic!("records must come in pairs");
        };
        assert_eq!(weight.measure_name, "weight");
        assert_eq!(visits.measure_name, "visits");
        assert_eq!(weight.dimensions, visits.dimensions);
        assert_eq!(visits.time.as_nanos(), weight.time.as_nanos() + 1);
        assert!(matches!(weight.measure_value, MeasureValue::Double(_)));
        assert!(matches!(visits.measure_value, MeasureValue::BigInt(_)));
    }

    assert!(records.windows(2).all(|pair| pair[0].time <= pair[1].time));
}

#[tokio::test]
async fn test_partial_rejection_does_not_stop_run() {
    let store = Arc::new(FaultyStore::new().reject_record(1, 7));
    let config = small_config(100, 25);
    let table = config.table.clone();

    let summary = run(store.clone(), config).await;

    assert_eq!(summary.batches_submitted, 4);
    assert_eq!(summary.batches_accepted, 3);
    assert_eq!(summary.batches_partially_rejected, 1);
    assert_eq!(summary.records_attempted, 200);
    assert_eq!(summary.records_ingested, 199);
    assert_eq!(summary.records_rejected, 1);
    assert_eq!(store.stored_records(&table).await, 199);
}

#[tokio::test]
async fn test_failed_batch_does_not_stop_run() {
    let store = Arc::new(FaultyStore::new().fail_request(0));
    let config = small_config(100, 25);
    let table = config.table.clone();

    let summary = run(store.clone(), config).await;

    assert_eq!(store.requests(), 4);
    assert_eq!(summary.batches_submitted, 4);
    assert_eq!(summary.batches_failed, 1);
    assert_eq!(summary.batches_accepted, 3);
    assert_eq!(summary.records_attempted, 200);
    assert_eq!(summary.records_ingested, 150);
    assert_eq!(store.stored_records(&table).await, 150);
}

#[tokio::test]
async fn test_seeded_runs_are_reproducible() {
    let first = Arc::new(FaultyStore::new());
    let second = Arc::new(FaultyStore::new());

    run(first.clone(), small_config(120, 25)).await;
    run(second.clone(), small_config(120, 25)).await;

    assert_eq!(first.writes(), second.writes());
}

#[tokio::test]
async fn test_concurrent_submission_keeps_batches_intact() {
    let sequential = Arc::new(FaultyStore::new());
    let concurrent = Arc::new(FaultyStore::new());

    run(sequential.clone(), small_config(300, 25)).await;
    let summary = run(
        concurrent.clone(),
        IngestionConfig {
            concurrency: 4,
            ..small_config(300, 25)
        },
    )
    .await;

    assert_eq!(summary.batches_submitted, 12);
    assert_eq!(summary.records_ingested, 600);

    let expected = sequential.writes();
    let actual = concurrent.writes();
    assert_eq!(actual.len(), expected.len());
    for batch in &actual {
        assert!(expected.contains(batch));
    }
}

#[tokio::test]
async fn test_cancelled_run_dispatches_nothing() {
    let store = Arc::new(FaultyStore::new());
    let config = small_config(100, 25);
    provision(store.as_ref(), &config.table).await;

    let ct = CancellationToken::new();
    ct.cancel();

    let rng = config.rng();
    let summary = IngestionPipeline::new(config, store.clone(), rng)
        .unwrap()
        .run(ct)
        .await
        .unwrap();

    assert_eq!(store.requests(), 0);
    assert_eq!(summary.batches_submitted, 0);
    assert!(summary.cancelled);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let store = Arc::new(fixed_clock_store());
    let config = small_config(100, 60);
    let rng = config.rng();

    assert!(IngestionPipeline::new(config, store, rng).is_err());
}
