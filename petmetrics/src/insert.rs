use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Args;
use petmetrics_ingest::{
    IngestionConfig, IngestionPipeline,
    config::{DEFAULT_BATCH_SIZE, DEFAULT_DEPENDENTS_PER_OWNER, DEFAULT_OWNERS, DEFAULT_TOTAL_STEPS},
};
use petmetrics_store::{InMemoryTimeSeriesStore, TimeSeriesStore};
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    error::{IngestSnafu, Result},
    provision::TableArgs,
    remote::RemoteArgs,
};

#[derive(Debug, Args)]
pub struct InsertArgs {
    #[clap(flatten)]
    table: TableArgs,
    /// Number of events to generate. Each event writes two records.
    #[arg(long, default_value_t = DEFAULT_TOTAL_STEPS)]
    total_records: u64,
    /// Events per write request.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: u64,
    /// Time of the first event.
    #[arg(long, default_value = "2024-09-30T21:00:00Z")]
    start: DateTime<Utc>,
    /// End of the time window, exclusive.
    #[arg(long, default_value = "2024-10-01T20:00:00Z")]
    end: DateTime<Utc>,
    /// Number of owners to draw events from.
    #[arg(long, default_value_t = DEFAULT_OWNERS)]
    owners: u32,
    /// Number of pets per owner.
    #[arg(long, default_value_t = DEFAULT_DEPENDENTS_PER_OWNER)]
    dependents_per_owner: u32,
    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of write requests in flight.
    #[arg(long, default_value = "1")]
    concurrency: usize,
    /// Create the database and table before inserting.
    #[arg(long)]
    provision: bool,
    /// Write to an in-process store instead of the remote server.
    #[arg(long)]
    in_memory: bool,
    #[clap(flatten)]
    remote: RemoteArgs,
}

impl InsertArgs {
    pub async fn run(self, ct: CancellationToken) -> Result<()> {
        let table = self.table.table_name()?;

        let store: Arc<dyn TimeSeriesStore> = if self.in_memory {
            Arc::new(InMemoryTimeSeriesStore::new())
        } else {
            self.remote.store_client()
        };

        if self.provision || self.in_memory {
            self.table.ensure(store.as_ref()).await?;
        }

        let config = IngestionConfig {
            table,
            total_steps: self.total_records,
            batch_size: self.batch_size,
            start: self.start,
            end: self.end,
            owners: self.owners,
            dependents_per_owner: self.dependents_per_owner,
            seed: self.seed,
            concurrency: self.concurrency,
        };

        let rng = config.rng();
        let summary = IngestionPipeline::new(config, store, rng)
            .context(IngestSnafu {})?
            .run(ct)
            .await
            .context(IngestSnafu {})?;

        info!(
            batches_accepted = summary.batches_accepted,
            batches_partially_rejected = summary.batches_partially_rejected,
            batches_failed = summary.batches_failed,
            "Insert finished"
        );

        Ok(())
    }
}
