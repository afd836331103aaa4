//! Display drivers for hobbyist breakout boards
//!
//! I2C drivers for three common display modules:
//!
//! - [`ssd1306`]: 128x64 monochrome OLED with a host-side framebuffer
//! - [`ssd1327`]: 96x96 4-bit grayscale OLED (Grove flavor)
//! - [`jhd1313`]: 16x2 character LCD with a separate RGB backlight
//!   controller on the same bus
//!
//! All drivers work over any [`breakout_hal::I2cBus`] and implement
//! [`breakout_hal::Device`] for teardown.

#![no_std]
#![deny(unsafe_code)]

pub mod jhd1313;
pub mod ssd1306;
pub mod ssd1327;

pub use jhd1313::Jhd1313;
pub use ssd1306::Ssd1306;
pub use ssd1327::Ssd1327;

#[cfg(test)]
pub(crate) mod testutil;
