use crate::config::RateTable;
use crate::types::FoodKind;

/// User intent for one cook cycle. `weight_grams` is the active input for
/// every food except `Other`, which takes an explicit duration instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CookSpec {
    pub food: FoodKind,
    pub weight_grams: Option<f64>,
    pub manual_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    #[error("weight must be a positive number of grams")]
    InvalidWeight,
    #[error("manual time must be a positive number of minutes")]
    InvalidManualTime,
}

/// Maps a cook spec to a recommended duration in whole seconds.
/// Pure and deterministic; anything non-finite or non-positive is rejected
/// rather than rounded into a zero-length cycle.
pub fn estimate(spec: &CookSpec, rates: &RateTable) -> Result<u32, EstimateError> {
    let minutes = match rates.minutes_per_gram(spec.food) {
        None => spec
            .manual_minutes
            .filter(|m| m.is_finite() && *m > 0.0)
            .ok_or(EstimateError::InvalidManualTime)?,
        Some(rate) => {
            let grams = spec
                .weight_grams
                .filter(|w| w.is_finite() && *w > 0.0)
                .ok_or(EstimateError::InvalidWeight)?;
            grams * rate
        }
    };

    let seconds = (minutes * 60.0).floor();
    if !seconds.is_finite() || seconds <= 0.0 || seconds > u32::MAX as f64 {
        return Err(match spec.food {
            FoodKind::Other => EstimateError::InvalidManualTime,
            _ => EstimateError::InvalidWeight,
        });
    }

    Ok(seconds as u32)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn weighed(food: FoodKind, grams: f64) -> CookSpec {
        CookSpec {
            food,
            weight_grams: Some(grams),
            manual_minutes: None,
        }
    }

    fn manual(minutes: f64) -> CookSpec {
        CookSpec {
            food: FoodKind::Other,
            weight_grams: None,
            manual_minutes: Some(minutes),
        }
    }

    #[test]
    fn bread_500g_is_twenty_minutes() {
        let seconds = estimate(&weighed(FoodKind::Bread, 500.0), &RateTable::default());
        assert_eq!(seconds, Ok(1_200));
    }

    #[test]
    fn each_food_uses_its_own_rate() {
        let rates = RateTable::default();

        assert_eq!(estimate(&weighed(FoodKind::Chicken, 100.0), &rates), Ok(720));
        assert_eq!(
            estimate(&weighed(FoodKind::Potatoes, 100.0), &rates),
            Ok(480)
        );
        assert_eq!(estimate(&weighed(FoodKind::Pizza, 100.0), &rates), Ok(300));
        assert_eq!(estimate(&weighed(FoodKind::Rice, 100.0), &rates), Ok(360));
    }

    #[test]
    fn monotonically_increasing_in_weight() {
        let rates = RateTable::default();
        let mut previous = 0;

        for grams in [10.0, 50.0, 120.0, 500.0, 2_000.0] {
            let seconds = estimate(&weighed(FoodKind::Chicken, grams), &rates).unwrap();
            assert!(seconds >= previous);
            previous = seconds;
        }
    }

    #[test]
    fn manual_time_converts_to_whole_seconds() {
        assert_eq!(estimate(&manual(10.0), &RateTable::default()), Ok(600));
        assert_eq!(estimate(&manual(0.5), &RateTable::default()), Ok(30));
    }

    #[test]
    fn rejects_zero_and_negative_weight() {
        let rates = RateTable::default();

        assert_eq!(
            estimate(&weighed(FoodKind::Bread, 0.0), &rates),
            Err(EstimateError::InvalidWeight)
        );
        assert_eq!(
            estimate(&weighed(FoodKind::Bread, -25.0), &rates),
            Err(EstimateError::InvalidWeight)
        );
    }

    #[test]
    fn rejects_non_finite_inputs() {
        let rates = RateTable::default();

        assert_eq!(
            estimate(&weighed(FoodKind::Pizza, f64::NAN), &rates),
            Err(EstimateError::InvalidWeight)
        );
        assert_eq!(
            estimate(&manual(f64::INFINITY), &rates),
            Err(EstimateError::InvalidManualTime)
        );
    }

    #[test]
    fn rejects_other_without_manual_time() {
        let spec = CookSpec {
            food: FoodKind::Other,
            weight_grams: Some(500.0),
            manual_minutes: None,
        };

        assert_eq!(
            estimate(&spec, &RateTable::default()),
            Err(EstimateError::InvalidManualTime)
        );
    }

    #[test]
    fn missing_weight_is_invalid_for_weighed_foods() {
        let spec = CookSpec {
            food: FoodKind::Chicken,
            weight_grams: None,
            manual_minutes: Some(10.0),
        };

        assert_eq!(
            estimate(&spec, &RateTable::default()),
            Err(EstimateError::InvalidWeight)
        );
    }

    #[test]
    fn sub_minute_estimate_floors_not_rounds() {
        // 10g of bread is 0.4 minutes -> 24 seconds exactly.
        assert_eq!(
            estimate(&weighed(FoodKind::Bread, 10.0), &RateTable::default()),
            Ok(24)
        );
    }
}
