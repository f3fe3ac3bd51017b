pub mod booking;
pub mod dispatch;
pub mod fare;
