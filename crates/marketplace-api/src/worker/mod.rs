pub mod booking_status_worker;

pub use booking_status_worker::{BookingStatusWorker, SweepReport};
