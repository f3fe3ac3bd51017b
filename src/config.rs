use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::engine::booking::{ActiveBookingPolicy, EngineSettings, UnknownBookingPolicy};
use crate::engine::fare::{BASE_FARE, FareConfig, MINUTES_PER_KM, PER_KM_RATE};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub event_buffer_size: usize,
    pub fare: FareConfig,
    pub booking_latency_ms: u64,
    pub cancel_latency_ms: u64,
    pub confirmation_delay_ms: u64,
    pub unknown_booking_policy: UnknownBookingPolicy,
    pub active_booking_policy: ActiveBookingPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let fare = FareConfig {
            base_fare: parse_or_default("BASE_FARE", BASE_FARE)?,
            per_km_rate: parse_or_default("PER_KM_RATE", PER_KM_RATE)?,
            minutes_per_km: parse_or_default("MINUTES_PER_KM", MINUTES_PER_KM)?,
        };
        fare.validate()?;

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("LOG_FORMAT").is_ok_and(|format| format == "json"),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            fare,
            booking_latency_ms: parse_or_default("BOOKING_LATENCY_MS", 2_000)?,
            cancel_latency_ms: parse_or_default("CANCEL_LATENCY_MS", 1_000)?,
            confirmation_delay_ms: parse_or_default("CONFIRMATION_DELAY_MS", 3_000)?,
            unknown_booking_policy: parse_or_default(
                "UNKNOWN_BOOKING_POLICY",
                UnknownBookingPolicy::Reject,
            )?,
            active_booking_policy: parse_or_default(
                "ACTIVE_BOOKING_POLICY",
                ActiveBookingPolicy::Reject,
            )?,
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            fare: self.fare,
            booking_latency: Duration::from_millis(self.booking_latency_ms),
            cancel_latency: Duration::from_millis(self.cancel_latency_ms),
            confirmation_delay: Duration::from_millis(self.confirmation_delay_ms),
            unknown_booking: self.unknown_booking_policy,
            active_booking: self.active_booking_policy,
        }
    }
}

impl FromStr for UnknownBookingPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(UnknownBookingPolicy::Reject),
            "ignore" => Ok(UnknownBookingPolicy::Ignore),
            other => Err(format!("expected reject or ignore, got {other:?}")),
        }
    }
}

impl FromStr for ActiveBookingPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(ActiveBookingPolicy::Reject),
            "replace" => Ok(ActiveBookingPolicy::Replace),
            other => Err(format!("expected reject or replace, got {other:?}")),
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::booking::{ActiveBookingPolicy, UnknownBookingPolicy};

    #[test]
    fn policies_parse_case_insensitively() {
        assert_eq!(
            "Ignore".parse::<UnknownBookingPolicy>(),
            Ok(UnknownBookingPolicy::Ignore)
        );
        assert_eq!(
            " REJECT ".parse::<UnknownBookingPolicy>(),
            Ok(UnknownBookingPolicy::Reject)
        );
        assert_eq!(
            "replace".parse::<ActiveBookingPolicy>(),
            Ok(ActiveBookingPolicy::Replace)
        );
    }

    #[test]
    fn unknown_policy_names_are_errors() {
        assert!("skip".parse::<UnknownBookingPolicy>().is_err());
        assert!("queue".parse::<ActiveBookingPolicy>().is_err());
    }
}
