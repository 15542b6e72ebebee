#![allow(dead_code)]

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use petmetrics_store::{
    DatabaseName, Dimension, InMemoryTimeSeriesStore, MeasureValue, Record, TableName,
    TableOptions, TimeSeriesStore, Timestamp,
};

/// 2024-10-01T00:00:00Z
pub const REFERENCE_TIME_SECS: u64 = 1_727_740_800;

pub fn reference_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(REFERENCE_TIME_SECS)
}

pub fn reference_timestamp() -> Timestamp {
    Timestamp::from_system_time(reference_time()).expect("reference time")
}

pub fn fixed_clock_store() -> InMemoryTimeSeriesStore {
    InMemoryTimeSeriesStore::new().with_clock(Arc::new(reference_time))
}

pub fn database_name() -> DatabaseName {
    DatabaseName::new_unchecked("PetMetricsDB")
}

pub fn table_name() -> TableName {
    TableName::new_unchecked("PetMetricsTable", database_name())
}

pub async fn initialize_test_table(store: &dyn TimeSeriesStore, options: TableOptions) -> TableName {
    store
        .create_database(database_name())
        .await
        .expect("create_database");
    store
        .create_table(table_name(), options)
        .await
        .expect("create_table");
    table_name()
}

pub fn weight_record(user: &str, pet: &str, weight: f64, time: Timestamp) -> Record {
    Record::new(
        vec![Dimension::new("userId", user), Dimension::new("petId", pet)],
        "weight",
        MeasureValue::Double(weight),
        time,
    )
}
