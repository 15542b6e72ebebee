//! Databases and tables.
use std::{sync::Arc, time::Duration};

use crate::{
    error::{InvalidArgumentSnafu, Result},
    resource_type,
};

resource_type!(Database, "databases");
resource_type!(Table, "tables", Database);

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

pub const MEMORY_RETENTION_HOURS_RANGE: std::ops::RangeInclusive<u32> = 1..=8766;
pub const MAGNETIC_RETENTION_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=73000;

/// A database groups tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub name: DatabaseName,
}

pub type DatabaseRef = Arc<Database>;

impl Database {
    pub fn new(name: DatabaseName) -> Self {
        Self { name }
    }
}

/// How long records stay in each storage tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionProperties {
    /// Hours a record stays in the fast, memory tier.
    pub memory_store_retention_hours: u32,
    /// Days a record stays in the cold, magnetic tier.
    pub magnetic_store_retention_days: u32,
}

impl Default for RetentionProperties {
    fn default() -> Self {
        Self {
            memory_store_retention_hours: 100,
            magnetic_store_retention_days: 1000,
        }
    }
}

impl RetentionProperties {
    pub fn new(memory_store_retention_hours: u32, magnetic_store_retention_days: u32) -> Self {
        Self {
            memory_store_retention_hours,
            magnetic_store_retention_days,
        }
    }

    pub fn memory_retention(&self) -> Duration {
        HOUR * self.memory_store_retention_hours
    }

    pub fn magnetic_retention(&self) -> Duration {
        DAY * self.magnetic_store_retention_days
    }

    /// Records older than this are outside both tiers.
    pub fn total_retention(&self) -> Duration {
        self.memory_retention() + self.magnetic_retention()
    }

    pub fn validate(&self) -> Result<()> {
        if !MEMORY_RETENTION_HOURS_RANGE.contains(&self.memory_store_retention_hours) {
            return InvalidArgumentSnafu {
                resource: "table",
                message: format!(
                    "memory store retention must be within {:?} hours, got {}",
                    MEMORY_RETENTION_HOURS_RANGE, self.memory_store_retention_hours
                ),
            }
            .fail();
        }

        if !MAGNETIC_RETENTION_DAYS_RANGE.contains(&self.magnetic_store_retention_days) {
            return InvalidArgumentSnafu {
                resource: "table",
                message: format!(
                    "magnetic store retention must be within {:?} days, got {}",
                    MAGNETIC_RETENTION_DAYS_RANGE, self.magnetic_store_retention_days
                ),
            }
            .fail();
        }

        Ok(())
    }
}

/// Whether records must carry the partition key dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionKeyEnforcement {
    #[default]
    Required,
    Optional,
}

/// A dimension used to partition the table's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionKey {
    pub dimension: String,
    pub enforcement: PartitionKeyEnforcement,
}

impl PartitionKey {
    pub fn required(dimension: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            enforcement: PartitionKeyEnforcement::Required,
        }
    }

    pub fn is_required(&self) -> bool {
        self.enforcement == PartitionKeyEnforcement::Required
    }
}

/// Options used when creating a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableOptions {
    pub retention: RetentionProperties,
    pub partition_key: Option<PartitionKey>,
}

impl TableOptions {
    pub fn new(retention: RetentionProperties) -> Self {
        Self {
            retention,
            partition_key: None,
        }
    }

    pub fn with_partition_key(mut self, partition_key: Option<PartitionKey>) -> Self {
        self.partition_key = partition_key;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.retention.validate()?;

        if let Some(key) = &self.partition_key
            && key.dimension.is_empty()
        {
            return InvalidArgumentSnafu {
                resource: "table",
                message: "partition key dimension must not be empty",
            }
            .fail();
        }

        Ok(())
    }
}

/// A table holding measurement records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: TableName,
    pub retention: RetentionProperties,
    pub partition_key: Option<PartitionKey>,
}

pub type TableRef = Arc<Table>;

impl Table {
    pub fn new(name: TableName, options: TableOptions) -> Self {
        Self {
            name,
            retention: options.retention,
            partition_key: options.partition_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_creation() {
        let database = DatabaseName::new("PetMetricsDB").unwrap();
        let name = TableName::new("PetMetricsTable", database.clone()).unwrap();
        let options = TableOptions::new(RetentionProperties::new(100, 365))
            .with_partition_key(Some(PartitionKey::required("id")));
        let table = Table::new(name.clone(), options);

        assert_eq!(table.name.parent(), &database);
        assert_eq!(table.retention.memory_retention(), Duration::from_secs(100 * 3600));
        assert_eq!(
            table.retention.magnetic_retention(),
            Duration::from_secs(365 * 86400)
        );
        assert!(table.partition_key.unwrap().is_required());
    }

    #[test]
    fn test_retention_validation() {
        assert!(RetentionProperties::default().validate().is_ok());
        assert!(RetentionProperties::new(0, 365).validate().is_err());
        assert!(RetentionProperties::new(100, 73001).validate().is_err());
    }

    #[test]
    fn test_empty_partition_key_is_invalid() {
        let options = TableOptions::default().with_partition_key(Some(PartitionKey::required("")));
        assert!(options.validate().unwrap_err().is_invalid_argument());
    }
}
