use petmetrics_observability::{Counter, UpDownCounter};

#[derive(Debug)]
pub struct StoreMetrics {
    pub databases_count: UpDownCounter<i64>,
    pub tables_count: UpDownCounter<i64>,
    pub ingested_records: Counter<u64>,
    pub rejected_records: Counter<u64>,
}

impl Default for StoreMetrics {
    fn default() -> Self {
        let meter = petmetrics_observability::meter("store");

        Self {
            databases_count: meter
                .i64_up_down_counter("store.databases.count")
                .with_description("the number of databases")
                .build(),
            tables_count: meter
                .i64_up_down_counter("store.tables.count")
                .with_description("the number of tables")
                .build(),
            ingested_records: meter
                .u64_counter("store.records.ingested")
                .with_unit("{record}")
                .with_description("records written to tables")
                .build(),
            rejected_records: meter
                .u64_counter("store.records.rejected")
                .with_unit("{record}")
                .with_description("records refused by the store")
                .build(),
        }
    }
}
