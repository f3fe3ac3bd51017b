use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point of interest. Coordinates are degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, address: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            address: address.into(),
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    /// Staying in the same state is not a transition and is handled by callers.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;

        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, InProgress)
                | (Confirmed, Cancelled)
                | (InProgress, Completed)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverInfo {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub rating: f64,
    pub vehicle_number: String,
    pub vehicle_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub pickup_location: Location,
    pub dropoff_location: Location,
    pub scheduled_time: DateTime<Utc>,
    pub distance_km: f64,
    pub fare: u32,
    pub estimated_duration_minutes: u32,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_info: Option<DriverInfo>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Merges the mutable fields carried by `update`. Derived pricing fields
    /// are not part of [`BookingUpdate`] and never change after creation.
    pub fn apply(&mut self, update: BookingUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(driver_info) = update.driver_info {
            self.driver_info = Some(driver_info);
        }
    }
}

/// Partial update of a booking's mutable fields.
#[derive(Debug, Clone, Default)]
pub struct BookingUpdate {
    pub status: Option<BookingStatus>,
    pub driver_info: Option<DriverInfo>,
}

impl BookingUpdate {
    pub fn status(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            driver_info: None,
        }
    }

    pub fn confirmed_with(driver_info: DriverInfo) -> Self {
        Self {
            status: Some(BookingStatus::Confirmed),
            driver_info: Some(driver_info),
        }
    }
}

/// Result envelope handed back to UI callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

impl BookingOutcome {
    pub fn ok(message: impl Into<String>, booking: Option<Booking>) -> Self {
        Self {
            success: true,
            message: message.into(),
            booking,
        }
    }
}
