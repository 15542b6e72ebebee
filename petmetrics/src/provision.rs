use clap::Args;
use petmetrics_store::{
    DatabaseName, PartitionKey, PartitionKeyEnforcement, RetentionProperties, TableName,
    TableOptions, TimeSeriesStore, ensure_database, ensure_table,
};
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{InvalidResourceNameSnafu, Result, StoreSnafu},
    remote::RemoteArgs,
};

/// The destination database and table, and the options used to create it.
#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// Database name.
    #[arg(long, default_value = "PetMetricsDB")]
    pub database: String,
    /// Table name.
    #[arg(long, default_value = "PetMetricsTable")]
    pub table: String,
    /// How long records stay in the memory tier.
    #[arg(long, default_value = "100")]
    pub memory_retention_hours: u32,
    /// How long records stay in the magnetic tier.
    #[arg(long, default_value = "1000")]
    pub magnetic_retention_days: u32,
    /// Dimension used as the table's partition key.
    #[arg(long)]
    pub partition_key: Option<String>,
    /// Accept records without the partition key dimension.
    #[arg(long, requires = "partition_key")]
    pub partition_key_optional: bool,
}

impl TableArgs {
    pub fn table_name(&self) -> Result<TableName> {
        let database = DatabaseName::new(&self.database).context(InvalidResourceNameSnafu {
            resource: "database",
        })?;

        TableName::new(&self.table, database).context(InvalidResourceNameSnafu {
            resource: "table",
        })
    }

    pub fn table_options(&self) -> TableOptions {
        let partition_key = self.partition_key.as_ref().map(|dimension| PartitionKey {
            dimension: dimension.clone(),
            enforcement: if self.partition_key_optional {
                PartitionKeyEnforcement::Optional
            } else {
                PartitionKeyEnforcement::Required
            },
        });

        TableOptions::new(RetentionProperties::new(
            self.memory_retention_hours,
            self.magnetic_retention_days,
        ))
        .with_partition_key(partition_key)
    }

    /// Create the database and table if they don't exist.
    pub async fn ensure(&self, store: &dyn TimeSeriesStore) -> Result<TableName> {
        let table = self.table_name()?;

        ensure_database(store, table.parent().clone())
            .await
            .context(StoreSnafu {
                operation: "ensure_database",
            })?;

        ensure_table(store, table.clone(), self.table_options())
            .await
            .context(StoreSnafu {
                operation: "ensure_table",
            })?;

        Ok(table)
    }
}

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    #[clap(flatten)]
    table: TableArgs,
    #[clap(flatten)]
    remote: RemoteArgs,
}

impl ProvisionArgs {
    pub async fn run(self, _ct: CancellationToken) -> Result<()> {
        let store = self.remote.store_client();
        self.table.ensure(store.as_ref()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[clap(flatten)]
        table: TableArgs,
    }

    #[test]
    fn test_default_table_args() {
        let cli = TestCli::parse_from(["test"]);
        let table = cli.table.table_name().unwrap();
        let options = cli.table.table_options();

        assert_eq!(table.to_string(), "databases/PetMetricsDB/tables/PetMetricsTable");
        assert_eq!(options.retention, RetentionProperties::new(100, 1000));
        assert_eq!(options.partition_key, None);
    }

    #[test]
    fn test_optional_partition_key() {
        let cli = TestCli::parse_from([
            "test",
            "--partition-key",
            "userId",
            "--partition-key-optional",
        ]);
        let partition_key = cli.table.table_options().partition_key.unwrap();

        assert_eq!(partition_key.dimension, "userId");
        assert!(!partition_key.is_required());
    }

    #[test]
    fn test_invalid_table_name() {
        let cli = TestCli::parse_from(["test", "--table", "x"]);
        assert!(cli.table.table_name().is_err());
    }
}
