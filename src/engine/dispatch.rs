use crate::error::AppError;
use crate::models::booking::{Booking, DriverInfo};

/// Source of the driver attached when a booking is confirmed.
pub trait DriverDispatcher: Send + Sync {
    fn assign(&self, booking: &Booking) -> Result<DriverInfo, AppError>;
}

/// Always hands out the same auto-rickshaw driver.
#[derive(Debug, Clone)]
pub struct MockDispatcher {
    driver: DriverInfo,
}

impl MockDispatcher {
    pub fn new(driver: DriverInfo) -> Self {
        Self { driver }
    }
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new(DriverInfo {
            id: "driver_123".to_string(),
            name: "Rajesh Kumar".to_string(),
            phone: "+91 9876543210".to_string(),
            rating: 4.8,
            vehicle_number: "KA 01 AB 1234".to_string(),
            vehicle_model: "Bajaj RE Auto".to_string(),
        })
    }
}

impl DriverDispatcher for MockDispatcher {
    fn assign(&self, _booking: &Booking) -> Result<DriverInfo, AppError> {
        Ok(self.driver.clone())
    }
}
