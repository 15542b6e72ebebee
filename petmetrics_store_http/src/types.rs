//! Request and response types for the store HTTP API.
//!
//! Field names follow the camelCase convention of managed time-series
//! services. Measure values and times travel as strings, tagged with
//! their type and unit.

use petmetrics_store::{
    Database, Dimension, MeasureValue, MeasureValueType, PartitionKey, PartitionKeyEnforcement,
    Record, RecordsIngested, RejectedRecord, RetentionProperties, Table, TableOptions, Timestamp,
    WriteOutcome,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseRequest {
    pub database_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseResponse {
    pub database_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListDatabasesResponse {
    pub databases: Vec<DatabaseResponse>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RetentionPropertiesPayload {
    pub memory_store_retention_period_in_hours: u32,
    pub magnetic_store_retention_period_in_days: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnforcementPayload {
    Required,
    Optional,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartitionKeyPayload {
    pub name: String,
    pub enforcement_in_record: EnforcementPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    pub table_name: String,
    pub retention_properties: RetentionPropertiesPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_partition_key: Option<PartitionKeyPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse {
    pub database_name: String,
    pub table_name: String,
    pub retention_properties: RetentionPropertiesPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_partition_key: Option<PartitionKeyPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListTablesResponse {
    pub tables: Vec<TableResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DimensionPayload {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
    Microseconds,
    #[default]
    Nanoseconds,
}

impl TimeUnit {
    fn nanos_per_unit(&self) -> u64 {
        match self {
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Nanoseconds => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    pub dimensions: Vec<DimensionPayload>,
    pub measure_name: String,
    pub measure_value: String,
    pub measure_value_type: String,
    pub time: String,
    #[serde(default)]
    pub time_unit: TimeUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WriteRecordsRequest {
    pub records: Vec<RecordPayload>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordsIngestedPayload {
    pub total: u32,
    pub memory_store: u32,
    pub magnetic_store: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRecordPayload {
    pub record_index: usize,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WriteRecordsResponse {
    pub records_ingested: RecordsIngestedPayload,
    #[serde(default)]
    pub rejected_records: Vec<RejectedRecordPayload>,
}

/// Response payload for errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&Database> for DatabaseResponse {
    fn from(database: &Database) -> Self {
        Self {
            database_name: database.name.id().to_string(),
        }
    }
}

impl From<RetentionProperties> for RetentionPropertiesPayload {
    fn from(retention: RetentionProperties) -> Self {
        Self {
            memory_store_retention_period_in_hours: retention.memory_store_retention_hours,
            magnetic_store_retention_period_in_days: retention.magnetic_store_retention_days,
        }
    }
}

impl From<RetentionPropertiesPayload> for RetentionProperties {
    fn from(payload: RetentionPropertiesPayload) -> Self {
        RetentionProperties::new(
            payload.memory_store_retention_period_in_hours,
            payload.magnetic_store_retention_period_in_days,
        )
    }
}

impl From<&PartitionKey> for PartitionKeyPayload {
    fn from(key: &PartitionKey) -> Self {
        let enforcement_in_record = match key.enforcement {
            PartitionKeyEnforcement::Required => EnforcementPayload::Required,
            PartitionKeyEnforcement::Optional => EnforcementPayload::Optional,
        };

        Self {
            name: key.dimension.clone(),
            enforcement_in_record,
        }
    }
}

impl From<PartitionKeyPayload> for PartitionKey {
    fn from(payload: PartitionKeyPayload) -> Self {
        let enforcement = match payload.enforcement_in_record {
            EnforcementPayload::Required => PartitionKeyEnforcement::Required,
            EnforcementPayload::Optional => PartitionKeyEnforcement::Optional,
        };

        PartitionKey {
            dimension: payload.name,
            enforcement,
        }
    }
}

impl CreateTableRequest {
    pub fn new(table_name: impl Into<String>, options: &TableOptions) -> Self {
        Self {
            table_name: table_name.into(),
            retention_properties: options.retention.into(),
            composite_partition_key: options.partition_key.as_ref().map(Into::into),
        }
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions::new(self.retention_properties.into())
            .with_partition_key(self.composite_partition_key.clone().map(Into::into))
    }
}

impl From<&Table> for TableResponse {
    fn from(table: &Table) -> Self {
        Self {
            database_name: table.name.parent().id().to_string(),
            table_name: table.name.id().to_string(),
            retention_properties: table.retention.into(),
            composite_partition_key: table.partition_key.as_ref().map(Into::into),
        }
    }
}

impl TableResponse {
    pub fn table_options(&self) -> TableOptions {
        TableOptions::new(self.retention_properties.into())
            .with_partition_key(self.composite_partition_key.clone().map(Into::into))
    }
}

impl From<&Record> for RecordPayload {
    fn from(record: &Record) -> Self {
        Self {
            dimensions: record
                .dimensions
                .iter()
                .map(|dimension| DimensionPayload {
                    name: dimension.name.clone(),
                    value: dimension.value.clone(),
                })
                .collect(),
            measure_name: record.measure_name.clone(),
            measure_value: record.measure_value.to_string(),
            measure_value_type: record.measure_value.value_type().to_string(),
            time: record.time.to_string(),
            time_unit: TimeUnit::Nanoseconds,
        }
    }
}

impl RecordPayload {
    /// Decode the payload, returning a message describing the first problem found.
    pub fn into_record(self) -> Result<Record, String> {
        let value_type = MeasureValueType::parse(&self.measure_value_type).ok_or_else(|| {
            format!("unsupported measure value type: {}", self.measure_value_type)
        })?;

        let measure_value = MeasureValue::parse(value_type, &self.measure_value).ok_or_else(|| {
            format!(
                "invalid {} measure value: {}",
                value_type, self.measure_value
            )
        })?;

        let time = self
            .time
            .parse::<u64>()
            .ok()
            .and_then(|time| time.checked_mul(self.time_unit.nanos_per_unit()))
            .map(Timestamp::from_nanos)
            .ok_or_else(|| format!("invalid record time: {}", self.time))?;

        let dimensions = self
            .dimensions
            .into_iter()
            .map(|dimension| Dimension::new(dimension.name, dimension.value))
            .collect();

        Ok(Record::new(
            dimensions,
            self.measure_name,
            measure_value,
            time,
        ))
    }
}

impl From<&WriteOutcome> for WriteRecordsResponse {
    fn from(outcome: &WriteOutcome) -> Self {
        let ingested = outcome.records_ingested;
        Self {
            records_ingested: RecordsIngestedPayload {
                total: ingested.total,
                memory_store: ingested.memory_store,
                magnetic_store: ingested.magnetic_store,
            },
            rejected_records: outcome
                .rejected
                .iter()
                .map(|rejected| RejectedRecordPayload {
                    record_index: rejected.record_index,
                    reason: rejected.reason.clone(),
                    existing_version: rejected.existing_version,
                })
                .collect(),
        }
    }
}

impl From<WriteRecordsResponse> for WriteOutcome {
    fn from(response: WriteRecordsResponse) -> Self {
        let ingested = response.records_ingested;
        Self {
            records_ingested: RecordsIngested {
                total: ingested.total,
                memory_store: ingested.memory_store,
                magnetic_store: ingested.magnetic_store,
            },
            rejected: response
                .rejected_records
                .into_iter()
                .map(|rejected| RejectedRecord {
                    record_index: rejected.record_index,
                    reason: rejected.reason,
                    existing_version: rejected.existing_version,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_payload_wire_format() {
        let record = Record::new(
            vec![Dimension::new("userId", "user_1"), Dimension::new("petId", "pet_user_1_4")],
            "visits",
            MeasureValue::BigInt(4),
            Timestamp::from_nanos(1_727_730_000_000_000_001),
        );

        let json = serde_json::to_value(RecordPayload::from(&record)).unwrap();
        assert_eq!(json["measureName"], "visits");
        assert_eq!(json["measureValue"], "4");
        assert_eq!(json["measureValueType"], "BIGINT");
        assert_eq!(json["time"], "1727730000000000001");
        assert_eq!(json["timeUnit"], "NANOSECONDS");
    }

    #[test]
    fn test_record_payload_time_units() {
        let payload = RecordPayload {
            dimensions: vec![DimensionPayload {
                name: "userId".to_string(),
                value: "user_2".to_string(),
            }],
            measure_name: "weight".to_string(),
            measure_value: "12.34".to_string(),
            measure_value_type: "DOUBLE".to_string(),
            time: "1727730000".to_string(),
            time_unit: TimeUnit::Seconds,
        };

        let record = payload.into_record().unwrap();
        assert_eq!(record.time.as_nanos(), 1_727_730_000_000_000_000);
        assert_eq!(record.measure_value, MeasureValue::Double(12.34));
    }

    #[test]
    fn test_record_payload_rejects_bad_values() {
        let payload = RecordPayload {
            dimensions: Vec::new(),
            measure_name: "weight".to_string(),
            measure_value: "heavy".to_string(),
            measure_value_type: "DOUBLE".to_string(),
            time: "1".to_string(),
            time_unit: TimeUnit::Nanoseconds,
        };

        assert!(payload.into_record().unwrap_err().contains("invalid DOUBLE"));
    }

    #[test]
    fn test_create_table_request_format() {
        let options = TableOptions::new(RetentionProperties::new(100, 1000))
            .with_partition_key(Some(PartitionKey::required("id")));
        let json = serde_json::to_value(CreateTableRequest::new("PetMetricsTable", &options)).unwrap();

        assert_eq!(json["tableName"], "PetMetricsTable");
        assert_eq!(
            json["retentionProperties"]["MemoryStoreRetentionPeriodInHours"],
            100
        );
        assert_eq!(json["compositePartitionKey"]["enforcementInRecord"], "REQUIRED");
    }
}
