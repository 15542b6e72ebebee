//! Fixed answers for every granularity.
//!
//! Stands in for a real aggregation backend until one exists. The event is
//! logged and otherwise ignored.
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

use crate::{
    TimeBucketedQuery,
    error::{InvalidLabelSnafu, Result},
    types::{
        BucketedSeries, DataPoint, DayLabel, Granularity, MonthLabel, QueryResponse, RangeLabel,
        YearLabel, YearMonth,
    },
};

#[derive(Debug, Clone, Default)]
pub struct StubQueryProvider {
    latency: Duration,
}

impl StubQueryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait `latency` before answering, to mimic a slow backend.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl TimeBucketedQuery for StubQueryProvider {
    async fn query(&self, granularity: Granularity, event: Value) -> Result<QueryResponse> {
        info!(%granularity, %event, "Query event");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match granularity {
            Granularity::All => all(),
            Granularity::Yearly => yearly(),
            Granularity::Monthly => monthly(),
            Granularity::Weekly => weekly(),
            Granularity::Daily => daily(),
        }
    }
}

fn all() -> Result<QueryResponse> {
    Ok(QueryResponse::All(BucketedSeries {
        median: 5.5,
        data_points: vec![
            DataPoint::new(YearLabel { date: 2024 }, Some(2.5)),
            DataPoint::new(YearLabel { date: 2023 }, None),
            DataPoint::new(YearLabel { date: 2022 }, Some(2.0)),
        ],
    }))
}

fn yearly() -> Result<QueryResponse> {
    let point = |year, month, value| -> Result<DataPoint<MonthLabel>> {
        let date = YearMonth::new(year, month).ok_or_else(|| {
            InvalidLabelSnafu {
                label: format!("{year}-{month}"),
            }
            .build()
        })?;
        Ok(DataPoint::new(MonthLabel { date }, value))
    };

    Ok(QueryResponse::Yearly(BucketedSeries {
        median: 6.5,
        data_points: vec![
            point(2024, 10, Some(1.8))?,
            point(2024, 9, Some(2.5))?,
            point(2024, 8, None)?,
            point(2023, 11, None)?,
        ],
    }))
}

fn monthly() -> Result<QueryResponse> {
    let point = |start, end, value| -> Result<DataPoint<RangeLabel>> {
        Ok(DataPoint::new(
            RangeLabel {
                start: day(2024, 10, start)?,
                end: day(2024, 10, end)?,
            },
            value,
        ))
    };

    Ok(QueryResponse::Monthly(BucketedSeries {
        median: 90.0,
        data_points: vec![
            point(25, 31, Some(4.5))?,
            point(18, 24, Some(3.5))?,
            point(11, 17, None)?,
            point(1, 10, None)?,
        ],
    }))
}

fn weekly() -> Result<QueryResponse> {
    Ok(QueryResponse::Weekly(BucketedSeries {
        median: 90.0,
        data_points: vec![
            DataPoint::new(DayLabel { date: day(2024, 10, 16)? }, Some(1.8)),
            DataPoint::new(DayLabel { date: day(2024, 10, 15)? }, Some(2.5)),
            DataPoint::new(DayLabel { date: day(2024, 10, 14)? }, None),
        ],
    }))
}

fn daily() -> Result<QueryResponse> {
    Ok(QueryResponse::Daily(BucketedSeries {
        median: 12.0,
        data_points: vec![
            DataPoint::new(DayLabel { date: day(2024, 10, 1)? }, Some(12.4)),
            DataPoint::new(DayLabel { date: day(2024, 9, 30)? }, None),
        ],
    }))
}

fn day(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        InvalidLabelSnafu {
            label: format!("{year}-{month}-{day}"),
        }
        .build()
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_every_granularity_answers() {
        let provider = StubQueryProvider::new();

        for granularity in Granularity::VARIANTS {
            let response = provider.query(granularity, json!({})).await.unwrap();
            assert_eq!(response.granularity(), granularity);
            assert!(!response.is_empty());
        }
    }

    #[tokio::test]
    async fn test_all_payload() {
        let response = StubQueryProvider::new()
            .query(Granularity::All, Value::Null)
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "median": 5.5,
                "dataPoints": [
                    { "date": 2024, "value": 2.5 },
                    { "date": 2023, "value": null },
                    { "date": 2022, "value": 2.0 },
                ],
            })
        );
    }

    #[tokio::test]
    async fn test_monthly_payload() {
        let response = StubQueryProvider::new()
            .query(Granularity::Monthly, json!({ "petId": "pet_user_1_1" }))
            .await
            .unwrap();

        assert_eq!(response.median(), 90.0);
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(
            value["dataPoints"][3],
            json!({ "start": "2024-10-01", "end": "2024-10-10", "value": null })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency() {
        let provider = StubQueryProvider::new().with_latency(Duration::from_secs(2));
        let started = tokio::time::Instant::now();

        provider.query(Granularity::Weekly, Value::Null).await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
