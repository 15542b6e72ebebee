//! Synthetic batch ingestion.
//!
//! An [`IngestionPipeline`] walks a [`Timeline`] step by step. Every step is
//! one event: an entity drawn from the [`EntityPool`] and two records made by
//! the [`MeasurementGenerator`]. Events are grouped into batches and written
//! to a [`TimeSeriesStore`](petmetrics_store::TimeSeriesStore) by the
//! [`BatchSubmitter`].
//!
//! A batch that fails or is partially rejected is logged and counted, the
//! run always goes on with the next batch.

pub mod config;
pub mod entity;
pub mod error;
pub mod generator;
mod metrics;
pub mod pipeline;
pub mod submitter;
pub mod timeline;

pub use self::config::IngestionConfig;
pub use self::entity::{Entity, EntityPool};
pub use self::error::{IngestError, Result};
pub use self::generator::MeasurementGenerator;
pub use self::pipeline::{IngestionPipeline, IngestionSummary};
pub use self::submitter::{BatchOutcome, BatchSubmitter, RecordRejection};
pub use self::timeline::Timeline;
