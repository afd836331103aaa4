//! Hardware driver implementations
//!
//! This crate provides drivers for bus-attached sensors and LED
//! peripherals, written against the traits in breakout-hal:
//!
//! - Environmental sensor (BME280: temperature, pressure, humidity)
//! - Accelerometer (MMA7660, Grove 3-axis digital ±1.5g)
//! - LED strip (APA102 "DotStar", SPI)
//! - 18-channel LED driver (SN3218, the PiGlow board)
//!
//! All drivers are synchronous and blocking; each device instance owns
//! its bus handle for the lifetime of the session.

#![no_std]
#![deny(unsafe_code)]

pub mod led;
pub mod sensor;

#[cfg(test)]
pub(crate) mod testutil;
