//! Measurement records written to a table.
use std::{
    fmt,
    time::{Duration, SystemTime},
};

/// The maximum number of records accepted by a single write request.
pub const MAX_RECORDS_PER_WRITE: usize = 100;

/// A point in time with nanosecond resolution, relative to the unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Returns `None` if the time is before the unix epoch or does not fit in 64 bits.
    pub fn from_system_time(time: SystemTime) -> Option<Self> {
        let since_epoch = time.duration_since(SystemTime::UNIX_EPOCH).ok()?;
        u64::try_from(since_epoch.as_nanos()).ok().map(Self)
    }

    pub fn to_system_time(self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_nanos(self.0)
    }

    pub fn saturating_add(self, duration: Duration) -> Self {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(nanos))
    }

    pub fn saturating_sub(self, duration: Duration) -> Self {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        Self(self.0.saturating_sub(nanos))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dimension attached to a record, e.g. `userId=user_3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The type tag of a measure value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureValueType {
    Double,
    BigInt,
}

impl MeasureValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureValueType::Double => "DOUBLE",
            MeasureValueType::BigInt => "BIGINT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DOUBLE" => Some(MeasureValueType::Double),
            "BIGINT" => Some(MeasureValueType::BigInt),
            _ => None,
        }
    }
}

impl fmt::Display for MeasureValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed measure value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasureValue {
    Double(f64),
    BigInt(i64),
}

impl MeasureValue {
    pub fn value_type(&self) -> MeasureValueType {
        match self {
            MeasureValue::Double(_) => MeasureValueType::Double,
            MeasureValue::BigInt(_) => MeasureValueType::BigInt,
        }
    }

    /// Parses the string form of a value according to its type tag.
    pub fn parse(value_type: MeasureValueType, value: &str) -> Option<Self> {
        match value_type {
            MeasureValueType::Double => value.parse().ok().map(MeasureValue::Double),
            MeasureValueType::BigInt => value.parse().ok().map(MeasureValue::BigInt),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            MeasureValue::Double(value) => value.is_finite(),
            MeasureValue::BigInt(_) => true,
        }
    }
}

impl fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureValue::Double(value) => write!(f, "{value}"),
            MeasureValue::BigInt(value) => write!(f, "{value}"),
        }
    }
}

/// A single measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub dimensions: Vec<Dimension>,
    pub measure_name: String,
    pub measure_value: MeasureValue,
    pub time: Timestamp,
}

impl Record {
    pub fn new(
        dimensions: Vec<Dimension>,
        measure_name: impl Into<String>,
        measure_value: MeasureValue,
        time: Timestamp,
    ) -> Self {
        Self {
            dimensions,
            measure_name: measure_name.into(),
            measure_value,
            time,
        }
    }

    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.name == name)
            .map(|dimension| dimension.value.as_str())
    }
}

/// A record the store refused to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Index of the record in the write request.
    pub record_index: usize,
    /// Human readable reason.
    pub reason: String,
    /// Version of the already stored record, for duplicate rejections.
    pub existing_version: Option<u64>,
}

/// How many records were written and to which storage tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordsIngested {
    pub total: u32,
    pub memory_store: u32,
    pub magnetic_store: u32,
}

/// The result of a write request that reached the store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriteOutcome {
    pub records_ingested: RecordsIngested,
    pub rejected: Vec<RejectedRecord>,
}

impl WriteOutcome {
    pub fn is_fully_accepted(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_value_parse() {
        assert_eq!(
            MeasureValue::parse(MeasureValueType::Double, "12.34"),
            Some(MeasureValue::Double(12.34))
        );
        assert_eq!(
            MeasureValue::parse(MeasureValueType::BigInt, "7"),
            Some(MeasureValue::BigInt(7))
        );
        assert_eq!(MeasureValue::parse(MeasureValueType::BigInt, "7.5"), None);
        assert_eq!(MeasureValueType::parse("VARCHAR"), None);
    }

    #[test]
    fn test_timestamp_system_time_conversion() {
        let ts = Timestamp::from_nanos(1_727_730_000_000_000_001);
        assert_eq!(Timestamp::from_system_time(ts.to_system_time()), Some(ts));
        assert_eq!(
            ts.saturating_add(Duration::from_nanos(1)).as_nanos(),
            1_727_730_000_000_000_002
        );
    }

    #[test]
    fn test_record_dimension_lookup() {
        let record = Record::new(
            vec![Dimension::new("userId", "user_1"), Dimension::new("petId", "pet_user_1_2")],
            "weight",
            MeasureValue::Double(10.5),
            Timestamp::from_nanos(1),
        );

        assert_eq!(record.dimension("petId"), Some("pet_user_1_2"));
        assert_eq!(record.dimension("id"), None);
    }
}
