pub mod coercion;
pub mod extraction;
pub mod qr_detection;
