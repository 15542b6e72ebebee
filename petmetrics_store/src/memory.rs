//! In-memory implementation of the time-series store.
//!
//! All data lives in a `RwLock`-protected map. Suitable for tests and the
//! `dev` server. Writes follow the semantics of a managed time-series
//! service: invalid records are rejected one by one and the rest of the
//! batch is stored.

use std::{
    collections::{BTreeMap, HashMap, hash_map::Entry},
    sync::Arc,
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use petmetrics_observability::KeyValue;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    TimeSeriesStore,
    error::{InvalidArgumentSnafu, Result, StoreError},
    metrics::StoreMetrics,
    record::{
        Dimension, MAX_RECORDS_PER_WRITE, MeasureValue, Record, RecordsIngested, RejectedRecord,
        Timestamp, WriteOutcome,
    },
    table::{Database, DatabaseName, Table, TableName, TableOptions},
};

/// How far in the future a record's time may be.
const MAX_FUTURE_SKEW: Duration = Duration::from_secs(15 * 60);

/// Source of the current time, used to evaluate retention windows.
pub type Clock = Arc<dyn Fn() -> SystemTime + Send + Sync>;

/// Records are unique by dimensions, measure name and time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    dimensions: Vec<Dimension>,
    measure_name: String,
    time: Timestamp,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    value: MeasureValue,
    version: u64,
}

#[derive(Debug)]
struct TableState {
    table: Table,
    records: HashMap<RecordKey, StoredRecord>,
}

#[derive(Debug, Default)]
struct StoreState {
    databases: BTreeMap<DatabaseName, Database>,
    tables: BTreeMap<TableName, TableState>,
}

pub struct InMemoryTimeSeriesStore {
    state: RwLock<StoreState>,
    clock: Clock,
    metrics: StoreMetrics,
}

impl InMemoryTimeSeriesStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            clock: Arc::new(SystemTime::now),
            metrics: StoreMetrics::default(),
        }
    }

    /// Evaluate retention windows against `clock` instead of the system time.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The number of records stored in a table.
    pub async fn record_count(&self, table: &TableName) -> Result<usize> {
        let state = self.state.read().await;
        state
            .tables
            .get(table)
            .map(|table| table.records.len())
            .ok_or_else(|| table_not_found(table))
    }
}

impl Default for InMemoryTimeSeriesStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryTimeSeriesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTimeSeriesStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TimeSeriesStore for InMemoryTimeSeriesStore {
    async fn create_database(&self, name: DatabaseName) -> Result<Database> {
        let mut state = self.state.write().await;

        if state.databases.contains_key(&name) {
            return Err(StoreError::AlreadyExists {
                resource: "database",
                message: name.to_string(),
            });
        }

        let database = Database::new(name.clone());
        state.databases.insert(name, database.clone());

        self.metrics.databases_count.add(1, &[]);

        Ok(database)
    }

    async fn get_database(&self, name: DatabaseName) -> Result<Database> {
        let state = self.state.read().await;
        state
            .databases
            .get(&name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                resource: "database",
                message: name.to_string(),
            })
    }

    async fn list_databases(&self) -> Result<Vec<Database>> {
        let state = self.state.read().await;
        Ok(state.databases.values().cloned().collect())
    }

    async fn create_table(&self, name: TableName, options: TableOptions) -> Result<Table> {
        options.validate()?;

        let mut state = self.state.write().await;

        if !state.databases.contains_key(name.parent()) {
            return Err(StoreError::NotFound {
                resource: "database",
                message: name.parent().to_string(),
            });
        }

        if state.tables.contains_key(&name) {
            return Err(StoreError::AlreadyExists {
                resource: "table",
                message: name.to_string(),
            });
        }

        let table = Table::new(name.clone(), options);
        state.tables.insert(
            name.clone(),
            TableState {
                table: table.clone(),
                records: HashMap::new(),
            },
        );

        self.metrics.tables_count.add(
            1,
            &[KeyValue::new("database", name.parent().id().to_string())],
        );

        Ok(table)
    }

    async fn get_table(&self, name: TableName) -> Result<Table> {
        let state = self.state.read().await;
        state
            .tables
            .get(&name)
            .map(|table| table.table.clone())
            .ok_or_else(|| table_not_found(&name))
    }

    async fn list_tables(&self, database: DatabaseName) -> Result<Vec<Table>> {
        let state = self.state.read().await;

        if !state.databases.contains_key(&database) {
            return Err(StoreError::NotFound {
                resource: "database",
                message: database.to_string(),
            });
        }

        Ok(state
            .tables
            .values()
            .filter(|table| table.table.name.parent() == &database)
            .map(|table| table.table.clone())
            .collect())
    }

    async fn write_records(&self, table: TableName, records: &[Record]) -> Result<WriteOutcome> {
        if records.is_empty() || records.len() > MAX_RECORDS_PER_WRITE {
            return InvalidArgumentSnafu {
                resource: "records",
                message: format!(
                    "a write must contain between 1 and {MAX_RECORDS_PER_WRITE} records, got {}",
                    records.len()
                ),
            }
            .fail();
        }

        let now = Timestamp::from_system_time((self.clock)()).unwrap_or_default();

        let mut state = self.state.write().await;
        let table_state = state
            .tables
            .get_mut(&table)
            .ok_or_else(|| table_not_found(&table))?;

        let outcome = table_state.write(records, now);

        debug!(
            table = %table,
            ingested = outcome.records_ingested.total,
            rejected = outcome.rejected.len(),
            "records written"
        );

        let table_attr = [KeyValue::new("table", table.id().to_string())];
        self.metrics
            .ingested_records
            .add(outcome.records_ingested.total as u64, &table_attr);
        self.metrics
            .rejected_records
            .add(outcome.rejected.len() as u64, &table_attr);

        Ok(outcome)
    }
}

impl TableState {
    fn write(&mut self, records: &[Record], now: Timestamp) -> WriteOutcome {
        let retention = self.table.retention;
        let oldest_allowed = now.saturating_sub(retention.total_retention());
        let oldest_in_memory = now.saturating_sub(retention.memory_retention());
        let newest_allowed = now.saturating_add(MAX_FUTURE_SKEW);

        let mut ingested = RecordsIngested::default();
        let mut rejected = Vec::new();

        for (record_index, record) in records.iter().enumerate() {
            if let Some(reason) = self.validate_record(record) {
                rejected.push(RejectedRecord {
                    record_index,
                    reason,
                    existing_version: None,
                });
                continue;
            }

            if record.time < oldest_allowed {
                rejected.push(RejectedRecord {
                    record_index,
                    reason: format!(
                        "record time {} is older than the table retention window",
                        record.time
                    ),
                    existing_version: None,
                });
                continue;
            }

            if record.time > newest_allowed {
                rejected.push(RejectedRecord {
                    record_index,
                    reason: format!("record time {} is too far in the future", record.time),
                    existing_version: None,
                });
                continue;
            }

            let mut dimensions = record.dimensions.clone();
            dimensions.sort();
            let key = RecordKey {
                dimensions,
                measure_name: record.measure_name.clone(),
                time: record.time,
            };

            match self.records.entry(key) {
                Entry::Occupied(entry) if entry.get().value != record.measure_value => {
                    rejected.push(RejectedRecord {
                        record_index,
                        reason: "a record with the same dimensions, measure name and time already exists with a different value".to_string(),
                        existing_version: Some(entry.get().version),
                    });
                    continue;
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(entry) => {
                    entry.insert(StoredRecord {
                        value: record.measure_value,
                        version: 1,
                    });
                }
            }

            ingested.total += 1;
            if record.time >= oldest_in_memory {
                ingested.memory_store += 1;
            } else {
                ingested.magnetic_store += 1;
            }
        }

        WriteOutcome {
            records_ingested: ingested,
            rejected,
        }
    }

    fn validate_record(&self, record: &Record) -> Option<String> {
        if record.measure_name.is_empty() {
            return Some("measure name must not be empty".to_string());
        }

        if record.dimensions.is_empty() {
            return Some("record must have at least one dimension".to_string());
        }

        if let Some(dimension) = record
            .dimensions
            .iter()
            .find(|dimension| dimension.name.is_empty() || dimension.value.is_empty())
        {
            return Some(format!(
                "dimension '{}' must have a non-empty name and value",
                dimension.name
            ));
        }

        if let Some(key) = &self.table.partition_key
            && key.is_required()
            && record.dimension(&key.dimension).is_none()
        {
            return Some(format!(
                "missing required partition key dimension '{}'",
                key.dimension
            ));
        }

        if !record.measure_value.is_finite() {
            return Some(format!(
                "measure value for '{}' must be finite",
                record.measure_name
            ));
        }

        None
    }
}

fn table_not_found(name: &TableName) -> StoreError {
    StoreError::NotFound {
        resource: "table",
        message: name.to_string(),
    }
}
