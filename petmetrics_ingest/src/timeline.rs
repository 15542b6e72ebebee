//! Spreads a fixed number of steps evenly over a time window.
use std::{num::NonZeroU64, ops::Range, time::Duration};

use chrono::{DateTime, Utc};
use petmetrics_store::Timestamp;

use crate::error::{InvalidConfigSnafu, Result, TimeOutOfRangeSnafu};

/// Maps step indices to timestamps in `[start, end)`.
///
/// Step `i` is placed at `start + i * (end - start) / total_steps`, computed
/// in integer nanoseconds so timestamps never decrease and rounding errors
/// do not accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    start: Timestamp,
    end: Timestamp,
    total_steps: u64,
}

impl Timeline {
    pub fn new(start: Timestamp, end: Timestamp, total_steps: u64) -> Result<Self> {
        if start >= end {
            return InvalidConfigSnafu {
                message: format!("timeline start {start} must be before end {end}"),
            }
            .fail();
        }

        if total_steps == 0 {
            return InvalidConfigSnafu {
                message: "timeline needs at least one step",
            }
            .fail();
        }

        Ok(Self {
            start,
            end,
            total_steps,
        })
    }

    pub fn from_datetimes(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        total_steps: u64,
    ) -> Result<Self> {
        Self::new(to_timestamp(start)?, to_timestamp(end)?, total_steps)
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    fn span_nanos(&self) -> u64 {
        self.end.as_nanos() - self.start.as_nanos()
    }

    /// The average distance between two steps, truncated to nanoseconds.
    pub fn increment(&self) -> Duration {
        Duration::from_nanos(self.span_nanos() / self.total_steps)
    }

    /// The timestamp of `step`.
    pub fn timestamp_at(&self, step: u64) -> Timestamp {
        let offset = u128::from(step) * u128::from(self.span_nanos()) / u128::from(self.total_steps);
        let offset = u64::try_from(offset).unwrap_or(u64::MAX);
        Timestamp::from_nanos(self.start.as_nanos().saturating_add(offset))
    }

    /// The number of batches of `batch_size` steps needed to cover all steps.
    pub fn batch_count(&self, batch_size: NonZeroU64) -> u64 {
        self.total_steps.div_ceil(batch_size.get())
    }

    /// Consecutive step ranges of `batch_size` steps. The last range holds
    /// the remainder.
    pub fn batches(&self, batch_size: NonZeroU64) -> BatchRanges {
        BatchRanges {
            next: 0,
            total_steps: self.total_steps,
            batch_size: batch_size.get(),
        }
    }
}

/// Iterator returned by [`Timeline::batches`].
#[derive(Debug, Clone)]
pub struct BatchRanges {
    next: u64,
    total_steps: u64,
    batch_size: u64,
}

impl Iterator for BatchRanges {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total_steps {
            return None;
        }

        let start = self.next;
        let end = start.saturating_add(self.batch_size).min(self.total_steps);
        self.next = end;

        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total_steps - self.next).div_ceil(self.batch_size);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// Convert a UTC time to nanoseconds since the epoch.
pub fn to_timestamp(time: DateTime<Utc>) -> Result<Timestamp> {
    time.timestamp_nanos_opt()
        .and_then(|nanos| u64::try_from(nanos).ok())
        .map(Timestamp::from_nanos)
        .ok_or_else(|| {
            TimeOutOfRangeSnafu {
                time: time.to_rfc3339(),
            }
            .build()
        })
}
