//! Synthetic measurement generation.
use std::{ops::RangeInclusive, time::Duration};

use petmetrics_store::{MeasureValue, Record, Timestamp};
use rand::Rng;

use crate::{
    entity::Entity,
    error::{InvalidConfigSnafu, Result},
};

pub const WEIGHT_MEASURE: &str = "weight";
pub const VISITS_MEASURE: &str = "visits";

/// Number of records produced for every event.
pub const RECORDS_PER_EVENT: usize = 2;

/// Produces the records of one event: a weight and a visit count.
///
/// The visits record is written 1ns after the weight record so the two never
/// collide on `(dimensions, time)`.
#[derive(Debug, Clone)]
pub struct MeasurementGenerator {
    weight_range: RangeInclusive<f64>,
    visits_range: RangeInclusive<i64>,
}

impl MeasurementGenerator {
    pub fn new(weight_range: RangeInclusive<f64>, visits_range: RangeInclusive<i64>) -> Result<Self> {
        let valid_weight = weight_range.start().is_finite()
            && weight_range.end().is_finite()
            && weight_range.start() <= weight_range.end();

        if !valid_weight || visits_range.is_empty() {
            return InvalidConfigSnafu {
                message: format!(
                    "invalid measure ranges: weight {weight_range:?}, visits {visits_range:?}"
                ),
            }
            .fail();
        }

        Ok(Self {
            weight_range,
            visits_range,
        })
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        entity: &Entity,
        time: Timestamp,
    ) -> [Record; RECORDS_PER_EVENT] {
        let weight = round_to_cents(rng.gen_range(self.weight_range.clone()));
        let visits = rng.gen_range(self.visits_range.clone());

        [
            Record::new(
                entity.dimensions(),
                WEIGHT_MEASURE,
                MeasureValue::Double(weight),
                time,
            ),
            Record::new(
                entity.dimensions(),
                VISITS_MEASURE,
                MeasureValue::BigInt(visits),
                time.saturating_add(Duration::from_nanos(1)),
            ),
        ]
    }
}

impl Default for MeasurementGenerator {
    fn default() -> Self {
        Self {
            weight_range: 5.0..=50.0,
            visits_range: 1..=10,
        }
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_event_records_share_dimensions() {
        let generator = MeasurementGenerator::default();
        let mut rng = StdRng::seed_from_u64(42);
        let entity = Entity::new("user_1", "pet_user_1_1");
        let time = Timestamp::from_nanos(1_727_730_000_000_000_000);

        let [weight, visits] = generator.generate(&mut rng, &entity, time);

        assert_eq!(weight.measure_name, "weight");
        assert_eq!(visits.measure_name, "visits");
        assert_eq!(weight.dimensions, visits.dimensions);
        assert_eq!(weight.time, time);
        assert_eq!(visits.time.as_nanos() - weight.time.as_nanos(), 1);
    }

    #[test]
    fn test_values_in_range() {
        let generator = MeasurementGenerator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let entity = Entity::new("user_2", "pet_user_2_3");

        for step in 0..500 {
            let [weight, visits] =
                generator.generate(&mut rng, &entity, Timestamp::from_nanos(step));

            let MeasureValue::Double(weight) = weight.measure_value else {
                panic!("weight must be a double");
            };
            assert!((5.0..=50.0).contains(&weight));
            assert_eq!(weight, round_to_cents(weight));

            let MeasureValue::BigInt(visits) = visits.measure_value else {
                panic!("visits must be a bigint");
            };
            assert!((1..=10).contains(&visits));
        }
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(MeasurementGenerator::new(50.0..=5.0, 1..=10).is_err());
        assert!(MeasurementGenerator::new(5.0..=f64::INFINITY, 1..=10).is_err());
        assert!(MeasurementGenerator::new(5.0..=50.0, 10..=1).is_err());
        assert!(MeasurementGenerator::new(1.0..=1.0, 3..=3).is_ok());
    }
}
