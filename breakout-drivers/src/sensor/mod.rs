//! Bus-attached sensor drivers

pub mod bme280;
pub mod mma7660;

pub use bme280::Bme280;
pub use mma7660::Mma7660;
