//! Time-bucketed queries over pet measurements.
//!
//! A [`TimeBucketedQuery`] answers with a median and one data point per
//! bucket, where the bucket label depends on the [`Granularity`]. Only the
//! [`StubQueryProvider`] exists for now.

pub mod error;
pub mod http;
pub mod stub;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

pub use self::error::{QueryError, Result};
pub use self::http::HttpQueryServer;
pub use self::stub::StubQueryProvider;
pub use self::types::{Granularity, QueryResponse};

#[async_trait]
pub trait TimeBucketedQuery: Send + Sync {
    /// Aggregate measurements into `granularity` buckets.
    ///
    /// `event` is the caller's request payload, passed through as is.
    async fn query(&self, granularity: Granularity, event: Value) -> Result<QueryResponse>;
}
