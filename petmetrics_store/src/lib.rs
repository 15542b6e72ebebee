//! Time-series store abstraction.
//!
//! The [`TimeSeriesStore`] trait is the contract between the ingestion
//! pipeline and wherever records end up. Callers receive an explicit
//! `Arc<dyn TimeSeriesStore>` handle, so tests can swap in
//! [`InMemoryTimeSeriesStore`] or their own double.

pub mod error;
mod memory;
mod metrics;
pub mod name;
pub mod provision;
pub mod record;
pub mod table;

use async_trait::async_trait;

pub use self::error::{ErrorKind, Result, StoreError};
pub use self::memory::{Clock, InMemoryTimeSeriesStore};
pub use self::name::{ResourceError, ResourceResult};
pub use self::provision::{ProvisionOutcome, ensure_database, ensure_table};
pub use self::record::{
    Dimension, MAX_RECORDS_PER_WRITE, MeasureValue, MeasureValueType, Record, RecordsIngested,
    RejectedRecord, Timestamp, WriteOutcome,
};
pub use self::table::{
    Database, DatabaseName, DatabaseRef, PartitionKey, PartitionKeyEnforcement,
    RetentionProperties, Table, TableName, TableOptions, TableRef,
};

/// A store of measurement records organized in databases and tables.
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    // Database operations

    /// Create a new database.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the database exists.
    async fn create_database(&self, name: DatabaseName) -> Result<Database>;

    /// Return the specified database.
    async fn get_database(&self, name: DatabaseName) -> Result<Database>;

    /// List all databases, sorted by name.
    async fn list_databases(&self) -> Result<Vec<Database>>;

    // Table operations

    /// Create a new table inside an existing database.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the table exists.
    async fn create_table(&self, name: TableName, options: TableOptions) -> Result<Table>;

    /// Return the specified table.
    async fn get_table(&self, name: TableName) -> Result<Table>;

    /// List the tables of a database, sorted by name.
    async fn list_tables(&self, database: DatabaseName) -> Result<Vec<Table>>;

    // Record operations

    /// Write a batch of at most [`MAX_RECORDS_PER_WRITE`] records.
    ///
    /// Errors apply to the whole request and mean nothing was written.
    /// Records refused individually are listed in [`WriteOutcome::rejected`]
    /// while the rest of the batch is stored.
    async fn write_records(&self, table: TableName, records: &[Record]) -> Result<WriteOutcome>;
}
