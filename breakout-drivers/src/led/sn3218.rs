//! SN3218 18-channel LED driver
//!
//! I2C driver for the Si-En SN3218 PWM LED controller, as found on the
//! Pimoroni PiGlow board. PWM writes only take effect once the commit
//! register is touched; every public setter commits for you.
//!
//! The PiGlow arranges its 18 channels as three spiral arms of six
//! colors; the color group methods light the same color on all three
//! arms at once.

use breakout_hal::{Device, Error, I2cBus};

/// I2C address of the device
pub const ADDRESS: u8 = 0x54;

/// SN3218 register addresses
pub mod reg {
    /// Software shutdown: 0 = shutdown, 1 = normal operation
    pub const ENABLE: u8 = 0x00;
    /// First of 18 PWM level registers (0x01..=0x12, channels 1..=18)
    pub const PWM_BASE: u8 = 0x01;
    /// LED enable bitmasks, channels 1-6 / 7-12 / 13-18
    pub const CONTROL_1: u8 = 0x13;
    /// Channels 7-12
    pub const CONTROL_2: u8 = 0x14;
    /// Channels 13-18
    pub const CONTROL_3: u8 = 0x15;
    /// Latches PWM and control writes into the output drivers
    pub const COMMIT: u8 = 0x16;
    /// Any write resets all registers
    pub const RESET: u8 = 0x17;
}

/// Channel numbers per PiGlow color, one per spiral arm
mod channels {
    pub const RED: [u8; 3] = [0x01, 0x07, 0x12];
    pub const ORANGE: [u8; 3] = [0x02, 0x08, 0x11];
    pub const YELLOW: [u8; 3] = [0x03, 0x09, 0x10];
    pub const GREEN: [u8; 3] = [0x04, 0x06, 0x0E];
    pub const BLUE: [u8; 3] = [0x05, 0x0C, 0x0F];
    pub const WHITE: [u8; 3] = [0x0A, 0x0B, 0x0D];
}

/// SN3218 driver
///
/// Opening performs no I/O: the chip keeps its last programmed state
/// across sessions unless it lost power, so call [`Sn3218::setup`] for
/// a clean start.
pub struct Sn3218<I2C> {
    i2c: I2C,
}

impl<I2C> Sn3218<I2C>
where
    I2C: I2cBus,
{
    /// Open the device
    pub fn open(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Reset the internal registers
    pub fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg(reg::RESET, 0xFF)
    }

    /// Enter software shutdown (registers retain their values)
    pub fn shutdown(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg(reg::ENABLE, 0x00)
    }

    /// Leave software shutdown
    pub fn enable(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg(reg::ENABLE, 0x01)
    }

    /// Reset, enable, and switch on all 18 channel drivers
    pub fn setup(&mut self) -> Result<(), Error<I2C::Error>> {
        self.reset()?;
        self.enable()?;
        self.set_control_register(1, 0xFF)?;
        self.set_control_register(2, 0xFF)?;
        self.set_control_register(3, 0xFF)?;
        Ok(())
    }

    /// Set all red LEDs to the level 0-255
    pub fn red(&mut self, level: u8) -> Result<(), Error<I2C::Error>> {
        self.set_group(&channels::RED, level)
    }

    /// Set all orange LEDs to the level 0-255
    pub fn orange(&mut self, level: u8) -> Result<(), Error<I2C::Error>> {
        self.set_group(&channels::ORANGE, level)
    }

    /// Set all yellow LEDs to the level 0-255
    pub fn yellow(&mut self, level: u8) -> Result<(), Error<I2C::Error>> {
        self.set_group(&channels::YELLOW, level)
    }

    /// Set all green LEDs to the level 0-255
    pub fn green(&mut self, level: u8) -> Result<(), Error<I2C::Error>> {
        self.set_group(&channels::GREEN, level)
    }

    /// Set all blue LEDs to the level 0-255
    pub fn blue(&mut self, level: u8) -> Result<(), Error<I2C::Error>> {
        self.set_group(&channels::BLUE, level)
    }

    /// Set all white LEDs to the level 0-255
    pub fn white(&mut self, level: u8) -> Result<(), Error<I2C::Error>> {
        self.set_group(&channels::WHITE, level)
    }

    /// Set one channel (1..=18) to the level 0-255
    pub fn set_channel(&mut self, channel: u8, level: u8) -> Result<(), Error<I2C::Error>> {
        if !(1..=18).contains(&channel) {
            return Err(Error::OutOfRange);
        }
        self.write_reg(reg::PWM_BASE + channel - 1, level)?;
        self.commit()
    }

    /// Set every channel to the level 0-255
    pub fn set_all(&mut self, level: u8) -> Result<(), Error<I2C::Error>> {
        for channel in 1..=18 {
            self.write_reg(reg::PWM_BASE + channel - 1, level)?;
        }
        self.commit()
    }

    /// Set one of the three control registers (1..=3) to an enable
    /// bitmask over its six channels (bits 0-5)
    pub fn set_control_register(
        &mut self,
        register: u8,
        enables: u8,
    ) -> Result<(), Error<I2C::Error>> {
        let address = match register {
            1 => reg::CONTROL_1,
            2 => reg::CONTROL_2,
            3 => reg::CONTROL_3,
            _ => return Err(Error::OutOfRange),
        };
        self.write_reg(address, enables)?;
        self.commit()
    }

    fn set_group(&mut self, group: &[u8; 3], level: u8) -> Result<(), Error<I2C::Error>> {
        for &channel in group {
            self.write_reg(channel, level)?;
        }
        self.commit()
    }

    fn commit(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg(reg::COMMIT, 0xFF)
    }

    fn write_reg(&mut self, r: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(ADDRESS, &[r, value]).map_err(Error::Bus)
    }
}

impl<I2C> Device for Sn3218<I2C>
where
    I2C: I2cBus,
{
    type Error = Error<I2C::Error>;

    fn close(mut self) -> Result<(), Self::Error> {
        // Best-effort software shutdown
        let _ = self.shutdown();
        Ok(())
    }
}
