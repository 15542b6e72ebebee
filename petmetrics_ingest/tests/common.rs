#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use petmetrics_ingest::IngestionConfig;
use petmetrics_store::{
    Database, DatabaseName, InMemoryTimeSeriesStore, Record, RejectedRecord, Result, StoreError,
    Table, TableName, TableOptions, TimeSeriesStore, WriteOutcome, ensure_database, ensure_table,
};

/// 2024-10-01T21:00:00Z, one hour after the default ingestion window.
pub const REFERENCE_TIME_SECS: u64 = 1_727_816_400;

pub fn fixed_clock_store() -> InMemoryTimeSeriesStore {
    InMemoryTimeSeriesStore::new().with_clock(Arc::new(|| {
        SystemTime::UNIX_EPOCH + Duration::from_secs(REFERENCE_TIME_SECS)
    }))
}

pub fn small_config(total_steps: u64, batch_size: u64) -> IngestionConfig {
    IngestionConfig {
        total_steps,
        batch_size,
        seed: Some(42),
        ..Default::default()
    }
}

pub async fn provision(store: &dyn TimeSeriesStore, table: &TableName) {
    ensure_database(store, table.parent().clone())
        .await
        .expect("ensure_database");
    ensure_table(store, table.clone(), TableOptions::default())
        .await
        .expect("ensure_table");
}

/// A store that records every write request and can inject faults.
///
/// Writes are forwarded to an in-memory store unless the request is selected
/// for failure. A record selected for rejection is withheld from the inner
/// store and reported as rejected.
pub struct FaultyStore {
    inner: InMemoryTimeSeriesStore,
    fail_requests: HashSet<usize>,
    reject_record: Option<(usize, usize)>,
    requests: AtomicUsize,
    writes: Mutex<Vec<Vec<Record>>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: fixed_clock_store(),
            fail_requests: HashSet::new(),
            reject_record: None,
            requests: AtomicUsize::new(0),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Fail the write request with the given (0-based) index.
    pub fn fail_request(mut self, request: usize) -> Self {
        self.fail_requests.insert(request);
        self
    }

    /// Reject one record of the given write request.
    pub fn reject_record(mut self, request: usize, record_index: usize) -> Self {
        self.reject_record = Some((request, record_index));
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<Vec<Record>> {
        self.writes.lock().unwrap().clone()
    }

    pub async fn stored_records(&self, table: &TableName) -> usize {
        self.inner.record_count(table).await.unwrap()
    }
}

#[async_trait]
impl TimeSeriesStore for FaultyStore {
    async fn create_database(&self, name: DatabaseName) -> Result<Database> {
        self.inner.create_database(name).await
    }

    async fn get_database(&self, name: DatabaseName) -> Result<Database> {
        self.inner.get_database(name).await
    }

    async fn list_databases(&self) -> Result<Vec<Database>> {
        self.inner.list_databases().await
    }

    async fn create_table(&self, name: TableName, options: TableOptions) -> Result<Table> {
        self.inner.create_table(name, options).await
    }

    async fn get_table(&self, name: TableName) -> Result<Table> {
        self.inner.get_table(name).await
    }

    async fn list_tables(&self, database: DatabaseName) -> Result<Vec<Table>> {
        self.inner.list_tables(database).await
    }

    async fn write_records(&self, table: TableName, records: &[Record]) -> Result<WriteOutcome> {
        let request = self.requests.fetch_add(1, Ordering::SeqCst);
        self.writes.lock().unwrap().push(records.to_vec());

        if self.fail_requests.contains(&request) {
            return Err(StoreError::Unavailable {
                message: format!("injected failure for request {request}"),
            });
        }

        let Some((reject_request, reject_index)) = self.reject_record else {
            return self.inner.write_records(table, records).await;
        };

        if reject_request != request || reject_index >= records.len() {
            return self.inner.write_records(table, records).await;
        }

        let mut records = records.to_vec();
        records.remove(reject_index);

        let mut outcome = self.inner.write_records(table, &records).await?;
        for rejected in &mut outcome.rejected {
            if rejected.record_index >= reject_index {
                rejected.record_index += 1;
            }
        }
        outcome.rejected.push(RejectedRecord {
            record_index: reject_index,
            reason: "injected rejection".to_string(),
            existing_version: None,
        });

        Ok(outcome)
    }
}
