use petmetrics_observability::Counter;

#[derive(Debug, Clone)]
pub struct IngestMetrics {
    pub batches: Counter<u64>,
    pub records_attempted: Counter<u64>,
    pub records_ingested: Counter<u64>,
    pub records_rejected: Counter<u64>,
}

impl Default for IngestMetrics {
    fn default() -> Self {
        let meter = petmetrics_observability::meter("ingest");

        Self {
            batches: meter
                .u64_counter("ingest.batches")
                .with_unit("{batch}")
                .with_description("batches submitted, by outcome")
                .build(),
            records_attempted: meter
                .u64_counter("ingest.records.attempted")
                .with_unit("{record}")
                .with_description("records sent to the store")
                .build(),
            records_ingested: meter
                .u64_counter("ingest.records.ingested")
                .with_unit("{record}")
                .with_description("records the store accepted")
                .build(),
            records_rejected: meter
                .u64_counter("ingest.records.rejected")
                .with_unit("{record}")
                .with_description("records the store refused")
                .build(),
        }
    }
}
