use serde::{Deserialize, Serialize};

use crate::models::booking::Booking;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum BookingEventKind {
    Created,
    Confirmed,
    Cancelled,
    StatusChanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    pub user_id: String,
    pub kind: BookingEventKind,
    pub booking: Booking,
}
