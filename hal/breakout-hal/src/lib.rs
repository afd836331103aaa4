//! Breakout Hardware Abstraction Layer
//!
//! This crate defines the bus traits the Breakout drivers are written
//! against, plus the shared device lifecycle traits and error taxonomy.
//! Any `embedded-hal` 1.0 bus implementation satisfies the traits through
//! the blanket impls, so the drivers run unchanged on top of
//! `linux-embedded-hal`, `rppal`, chip HALs, or a test fake.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers (breakout-drivers, -display)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  breakout-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ any embedded- │       │  test fakes   │
//! │  hal 1.0 bus  │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`spi::SpiBus`] - SPI bus operations
//! - [`device::Device`], [`device::Update`] - session lifecycle

#![no_std]
#![deny(unsafe_code)]

pub mod device;
pub mod i2c;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use device::{Device, Error, Update};
pub use i2c::I2cBus;
pub use spi::SpiBus;
