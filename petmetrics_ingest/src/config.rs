use std::num::{NonZeroU64, NonZeroUsize};

use chrono::{DateTime, TimeDelta, Utc};
use petmetrics_store::{DatabaseName, MAX_RECORDS_PER_WRITE, TableName};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    error::{InvalidConfigSnafu, Result},
    generator::RECORDS_PER_EVENT,
};

pub const DEFAULT_DATABASE: &str = "PetMetricsDB";
pub const DEFAULT_TABLE: &str = "PetMetricsTable";
pub const DEFAULT_TOTAL_STEPS: u64 = 100_000;
pub const DEFAULT_BATCH_SIZE: u64 = 25;
/// 2024-09-30T21:00:00Z
pub const DEFAULT_START_SECS: i64 = 1_727_730_000;
/// 2024-10-01T20:00:00Z
pub const DEFAULT_END_SECS: i64 = 1_727_812_800;
pub const DEFAULT_OWNERS: u32 = 19;
pub const DEFAULT_DEPENDENTS_PER_OWNER: u32 = 5;

/// Settings of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionConfig {
    /// Destination table. Its parent is the destination database.
    pub table: TableName,
    /// Number of events to generate.
    pub total_steps: u64,
    /// Events per batch. Every event yields two records.
    pub batch_size: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub owners: u32,
    pub dependents_per_owner: u32,
    /// Seed for reproducible runs. Entropy is used when unset.
    pub seed: Option<u64>,
    /// Maximum number of batches in flight.
    pub concurrency: usize,
}

impl IngestionConfig {
    pub fn database(&self) -> &DatabaseName {
        self.table.parent()
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_steps == 0 {
            return invalid("total steps must be greater than zero");
        }

        if self.batch_size == 0 {
            return invalid("batch size must be greater than zero");
        }

        let records_per_batch = self.batch_size.saturating_mul(RECORDS_PER_EVENT as u64);
        if records_per_batch > MAX_RECORDS_PER_WRITE as u64 {
            return invalid(format!(
                "batch size {} produces {records_per_batch} records per write, the limit is {MAX_RECORDS_PER_WRITE}",
                self.batch_size
            ));
        }

        if self.start >= self.end {
            return invalid(format!(
                "start {} must be before end {}",
                self.start.to_rfc3339(),
                self.end.to_rfc3339()
            ));
        }

        if self.owners == 0 || self.dependents_per_owner == 0 {
            return invalid("owners and dependents per owner must be greater than zero");
        }

        if self.concurrency == 0 {
            return invalid("concurrency must be greater than zero");
        }

        Ok(())
    }

    pub(crate) fn batch_size_nonzero(&self) -> Result<NonZeroU64> {
        NonZeroU64::new(self.batch_size).ok_or_else(|| {
            InvalidConfigSnafu {
                message: "batch size must be greater than zero",
            }
            .build()
        })
    }

    pub(crate) fn concurrency_nonzero(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.concurrency).ok_or_else(|| {
            InvalidConfigSnafu {
                message: "concurrency must be greater than zero",
            }
            .build()
        })
    }

    /// The random number generator for this run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            table: TableName::new_unchecked(
                DEFAULT_TABLE,
                DatabaseName::new_unchecked(DEFAULT_DATABASE),
            ),
            total_steps: DEFAULT_TOTAL_STEPS,
            batch_size: DEFAULT_BATCH_SIZE,
            start: DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(DEFAULT_START_SECS),
            end: DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(DEFAULT_END_SECS),
            owners: DEFAULT_OWNERS,
            dependents_per_owner: DEFAULT_DEPENDENTS_PER_OWNER,
            seed: None,
            concurrency: 1,
        }
    }
}

fn invalid(message: impl Into<String>) -> Result<()> {
    InvalidConfigSnafu {
        message: message.into(),
    }
    .fail()
}
