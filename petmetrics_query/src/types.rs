//! Response shapes of time-bucketed queries.
//!
//! Every granularity labels its buckets differently, but all responses share
//! the `{ median, dataPoints: [{ <label>, value }] }` layout.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, UnknownGranularitySnafu};

/// The size of the buckets a query aggregates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per year.
    All,
    /// One bucket per month.
    Yearly,
    /// Date ranges within a month.
    Monthly,
    /// One bucket per day of the week.
    Weekly,
    /// One bucket per day.
    Daily,
}

impl Granularity {
    pub const VARIANTS: [Granularity; 5] = [
        Granularity::All,
        Granularity::Yearly,
        Granularity::Monthly,
        Granularity::Weekly,
        Granularity::Daily,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::All => "all",
            Granularity::Yearly => "yearly",
            Granularity::Monthly => "monthly",
            Granularity::Weekly => "weekly",
            Granularity::Daily => "daily",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Granularity::VARIANTS
            .into_iter()
            .find(|granularity| granularity.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                UnknownGranularitySnafu {
                    granularity: s.to_string(),
                }
                .build()
            })
    }
}

/// A calendar year, e.g. `2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearLabel {
    pub date: i32,
}

/// A calendar month, serialized as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .split_once('-')
            .and_then(|(year, month)| YearMonth::new(year.parse().ok()?, month.parse().ok()?))
            .ok_or_else(|| format!("invalid month '{value}', expected YYYY-MM"))
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthLabel {
    pub date: YearMonth,
}

/// An inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeLabel {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLabel {
    pub date: NaiveDate,
}

/// One bucket. `value` is `None` when the bucket holds no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint<L> {
    #[serde(flatten)]
    pub label: L,
    pub value: Option<f64>,
}

impl<L> DataPoint<L> {
    pub fn new(label: L, value: Option<f64>) -> Self {
        Self { label, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketedSeries<L> {
    pub median: f64,
    pub data_points: Vec<DataPoint<L>>,
}

/// The answer to a query, labelled according to its granularity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    All(BucketedSeries<YearLabel>),
    Yearly(BucketedSeries<MonthLabel>),
    Monthly(BucketedSeries<RangeLabel>),
    Weekly(BucketedSeries<DayLabel>),
    Daily(BucketedSeries<DayLabel>),
}

impl QueryResponse {
    pub fn granularity(&self) -> Granularity {
        match self {
            QueryResponse::All(_) => Granularity::All,
            QueryResponse::Yearly(_) => Granularity::Yearly,
            QueryResponse::Monthly(_) => Granularity::Monthly,
            QueryResponse::Weekly(_) => Granularity::Weekly,
            QueryResponse::Daily(_) => Granularity::Daily,
        }
    }

    pub fn median(&self) -> f64 {
        match self {
            QueryResponse::All(series) => series.median,
            QueryResponse::Yearly(series) => series.median,
            QueryResponse::Monthly(series) => series.median,
            QueryResponse::Weekly(series) | QueryResponse::Daily(series) => series.median,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryResponse::All(series) => series.data_points.len(),
            QueryResponse::Yearly(series) => series.data_points.len(),
            QueryResponse::Monthly(series) => series.data_points.len(),
            QueryResponse::Weekly(series) | QueryResponse::Daily(series) => {
                series.data_points.len()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Error body returned by the query router.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub message: String,
}
