use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::geo::distance_km;
use crate::models::booking::Location;

pub const BASE_FARE: f64 = 50.0;
pub const PER_KM_RATE: f64 = 15.0;
pub const MINUTES_PER_KM: f64 = 3.0;

/// Linear pricing model: `base_fare + distance_km * per_km_rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareConfig {
    pub base_fare: f64,
    pub per_km_rate: f64,
    /// Flat travel-time heuristic, ignores traffic and time of day.
    pub minutes_per_km: f64,
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            base_fare: BASE_FARE,
            per_km_rate: PER_KM_RATE,
            minutes_per_km: MINUTES_PER_KM,
        }
    }
}

impl FareConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        let fields = [
            ("base_fare", self.base_fare),
            ("per_km_rate", self.per_km_rate),
            ("minutes_per_km", self.minutes_per_km),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::Internal(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        Ok(())
    }

    pub fn fare(&self, distance_km: f64) -> u32 {
        let raw = self.base_fare + distance_km.max(0.0) * self.per_km_rate;
        raw.round() as u32
    }

    pub fn estimated_duration_minutes(&self, distance_km: f64) -> u32 {
        (distance_km.max(0.0) * self.minutes_per_km).round() as u32
    }

    pub fn quote(&self, pickup: &Location, dropoff: &Location) -> Result<FareQuote, AppError> {
        let distance = round_to_cents(distance_km(pickup, dropoff)?);

        Ok(FareQuote {
            distance_km: distance,
            fare: self.fare(distance),
            estimated_duration_minutes: self.estimated_duration_minutes(distance),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FareQuote {
    pub distance_km: f64,
    pub fare: u32,
    pub estimated_duration_minutes: u32,
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::FareConfig;
    use crate::error::AppError;
    use crate::models::booking::Location;

    #[test]
    fn zero_distance_costs_the_base_fare() {
        let pricing = FareConfig::default();
        assert_eq!(pricing.fare(0.0), 50);
    }

    #[test]
    fn ten_km_costs_two_hundred() {
        let pricing = FareConfig::default();
        assert_eq!(pricing.fare(10.0), 200);
    }

    #[test]
    fn fare_never_decreases_with_distance() {
        let pricing = FareConfig::default();
        let mut previous = pricing.fare(0.0);

        for step in 1..=400 {
            let fare = pricing.fare(step as f64 * 0.05);
            assert!(fare >= previous);
            previous = fare;
        }
    }

    #[test]
    fn fare_rounds_to_nearest_unit() {
        let pricing = FareConfig::default();
        // 50 + 5.18 * 15 = 127.7
        assert_eq!(pricing.fare(5.18), 128);
        // 50 + 1.07 * 15 = 66.05
        assert_eq!(pricing.fare(1.07), 66);
    }

    #[test]
    fn duration_is_three_minutes_per_km() {
        let pricing = FareConfig::default();
        assert_eq!(pricing.estimated_duration_minutes(0.0), 0);
        assert_eq!(pricing.estimated_duration_minutes(5.18), 16);
        assert_eq!(pricing.estimated_duration_minutes(10.0), 30);
    }

    #[test]
    fn custom_rates_are_honoured() {
        let pricing = FareConfig {
            base_fare: 30.0,
            per_km_rate: 12.0,
            minutes_per_km: 4.0,
        };
        assert_eq!(pricing.fare(0.0), 30);
        assert_eq!(pricing.fare(2.5), 60);
        assert_eq!(pricing.estimated_duration_minutes(2.5), 10);
    }

    #[test]
    fn quote_rounds_distance_to_two_decimals() {
        let pricing = FareConfig::default();
        let pickup = Location::new(12.9716, 77.5946, "A");
        let dropoff = Location::new(12.9352, 77.6245, "B");

        let quote = pricing.quote(&pickup, &dropoff).unwrap();
        assert_eq!(quote.distance_km, 5.18);
        assert_eq!(quote.fare, 128);
        assert_eq!(quote.estimated_duration_minutes, 16);
    }

    #[test]
    fn quote_rejects_nan_coordinates() {
        let pricing = FareConfig::default();
        let pickup = Location::new(f64::NAN, 77.5946, "A");
        let dropoff = Location::new(12.9352, 77.6245, "B");

        assert!(matches!(
            pricing.quote(&pickup, &dropoff),
            Err(AppError::InvalidLocation(_))
        ));
    }

    #[test]
    fn negative_rates_fail_validation() {
        let pricing = FareConfig {
            per_km_rate: -1.0,
            ..FareConfig::default()
        };
        assert!(pricing.validate().is_err());
        assert!(FareConfig::default().validate().is_ok());
    }
}
