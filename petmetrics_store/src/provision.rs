//! Idempotent creation of databases and tables.
//!
//! An "already exists" answer from the store counts as success, so these
//! helpers can run on every start.
use tracing::info;

use crate::{
    TimeSeriesStore,
    error::Result,
    table::{DatabaseName, TableName, TableOptions},
};

/// What happened when ensuring a resource exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    AlreadyExists,
}

impl ProvisionOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, ProvisionOutcome::Created)
    }
}

/// Create the database unless it already exists.
pub async fn ensure_database(
    store: &dyn TimeSeriesStore,
    name: DatabaseName,
) -> Result<ProvisionOutcome> {
    match store.create_database(name.clone()).await {
        Ok(_) => {
            info!(database = %name, "Database created");
            Ok(ProvisionOutcome::Created)
        }
        Err(err) if err.is_already_exists() => {
            info!(database = %name, "Database already exists");
            Ok(ProvisionOutcome::AlreadyExists)
        }
        Err(err) => Err(err),
    }
}

/// Create the table unless it already exists.
///
/// The options of an existing table are left untouched.
pub async fn ensure_table(
    store: &dyn TimeSeriesStore,
    name: TableName,
    options: TableOptions,
) -> Result<ProvisionOutcome> {
    match store.create_table(name.clone(), options).await {
        Ok(table) => {
            info!(
                table = %name,
                memory_retention_hours = table.retention.memory_store_retention_hours,
                magnetic_retention_days = table.retention.magnetic_store_retention_days,
                partition_key = ?table.partition_key.map(|key| key.dimension),
                "Table created"
            );
            Ok(ProvisionOutcome::Created)
        }
        Err(err) if err.is_already_exists() => {
            info!(table = %name, "Table already exists");
            Ok(ProvisionOutcome::AlreadyExists)
        }
        Err(err) => Err(err),
    }
}
