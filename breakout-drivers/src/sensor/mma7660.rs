//! MMA7660 3-axis digital accelerometer
//!
//! Driver for the Freescale MMA7660FC (the Grove 3-Axis Digital
//! Accelerometer, ±1.5g) on I2C. The chip samples continuously in
//! active mode and latches X/Y/Z counts plus a tilt status byte;
//! `update` burst-reads those four registers. Interrupt routing is not
//! supported.

use breakout_hal::{Device, Error, I2cBus, Update};

/// I2C address of the sensor
pub const ADDRESS: u8 = 0x4C;

/// MMA7660 register addresses
pub mod reg {
    /// X axis counts, 6-bit two's complement
    pub const XOUT: u8 = 0x00;
    /// Y axis counts
    pub const YOUT: u8 = 0x01;
    /// Z axis counts
    pub const ZOUT: u8 = 0x02;
    /// Orientation, tap, shake and alert flags
    pub const TILT: u8 = 0x03;
    /// Power mode
    pub const MODE: u8 = 0x07;
    /// Sample rate / auto-sleep
    pub const SR: u8 = 0x08;
    /// Tap detection threshold
    pub const PDET: u8 = 0x09;
    /// Tap debounce count
    pub const PD: u8 = 0x0A;
}

/// Samples per second in auto-sleep (SR register codes)
mod rate {
    /// 120 samples/s, required for tap detection
    pub const SLEEP_120: u8 = 0x00;
    /// 32 samples/s, the power-up default used here
    pub const SLEEP_32: u8 = 0x02;
}

/// Counts per g at the default 1.5g range
const COUNTS_PER_G: f32 = 21.0;

/// Power mode
///
/// In standby the registers stay accessible over I2C but no new
/// measurements are taken; active mode measures continuously on all
/// three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Low-power register-access-only mode
    Standby,
    /// Continuous measurement
    Active,
}

impl Mode {
    const fn bits(self) -> u8 {
        match self {
            Self::Standby => 0x00,
            Self::Active => 0x01,
        }
    }
}

/// Device position decoded from the tilt status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Position {
    /// None of the documented orientations
    #[default]
    Unknown,
    /// Landscape to the left
    Left,
    /// Landscape to the right
    Right,
    /// Vertical, inverted
    Down,
    /// Vertical, normal
    Up,
}

impl Position {
    /// Decode the PoLa bits (TILT[4:2])
    fn from_tilt(tilt: u8) -> Self {
        match (tilt >> 2) & 0b111 {
            0b101 => Self::Down,
            0b110 => Self::Up,
            0b001 => Self::Left,
            0b010 => Self::Right,
            _ => Self::Unknown,
        }
    }
}

/// Published sample; stale until the first successful update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct State {
    /// X axis counts
    pub x: i8,
    /// Y axis counts
    pub y: i8,
    /// Z axis counts
    pub z: i8,
    /// Lying on its front
    pub front: bool,
    /// Lying on its back
    pub back: bool,
    /// Orientation
    pub position: Position,
    /// Tap detected since the last read (reading clears the flag)
    pub tapped: bool,
    /// Shake detected since the last read (reading clears the flag)
    pub shaken: bool,
}

impl State {
    /// Acceleration in g for each axis
    pub fn acceleration_g(&self) -> (f32, f32, f32) {
        (
            f32::from(self.x) / COUNTS_PER_G,
            f32::from(self.y) / COUNTS_PER_G,
            f32::from(self.z) / COUNTS_PER_G,
        )
    }
}

/// MMA7660 driver
pub struct Mma7660<I2C> {
    i2c: I2C,
    state: State,
    tap_enabled: bool,
}

impl<I2C> Mma7660<I2C>
where
    I2C: I2cBus,
{
    /// Open the sensor: standby, 32 samples/s with auto-sleep, active
    ///
    /// Tap detection is off by default; see [`Self::enable_tap`].
    pub fn open(i2c: I2C) -> Result<Self, Error<I2C::Error>> {
        let mut accel = Self {
            i2c,
            state: State::default(),
            tap_enabled: false,
        };
        accel.set_mode(Mode::Standby)?;
        accel.write_reg(reg::SR, rate::SLEEP_32)?;
        accel.set_mode(Mode::Active)?;
        Ok(accel)
    }

    /// Switch between standby and active mode
    ///
    /// The SR/PDET/PD registers only accept writes in standby.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<I2C::Error>> {
        self.write_reg(reg::MODE, mode.bits())
    }

    /// Enable tap detection
    ///
    /// Raises the sample rate to 120/s and sets the default debounce
    /// threshold of 80 samples.
    pub fn enable_tap(&mut self) -> Result<(), Error<I2C::Error>> {
        self.set_mode(Mode::Standby)?;
        self.write_reg(reg::SR, rate::SLEEP_120)?;
        self.write_reg(reg::PD, 80)?;
        self.set_mode(Mode::Active)?;
        self.tap_enabled = true;
        Ok(())
    }

    /// Set the tap debounce count: n adjacent detection tests must
    /// agree before a tap event is raised
    ///
    /// Enables tap detection first if it is off.
    pub fn set_tap_sensitivity(&mut self, n: u8) -> Result<(), Error<I2C::Error>> {
        if !self.tap_enabled {
            self.enable_tap()?;
        }
        self.set_mode(Mode::Standby)?;
        self.write_reg(reg::PD, n)?;
        self.set_mode(Mode::Active)
    }

    /// Whether tap detection has been enabled
    pub fn tap_enabled(&self) -> bool {
        self.tap_enabled
    }

    /// Last published sample
    pub fn state(&self) -> State {
        self.state
    }

    /// Read the sensor and refresh the published sample
    ///
    /// Returns [`Error::NotReady`] when the chip was updating a
    /// register as it was read (the per-axis invalid bit or the TILT
    /// alert flag); discard and call again.
    pub fn update(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut buf = [0u8; 4];
        self.i2c
            .write_read(ADDRESS, &[reg::XOUT], &mut buf)
            .map_err(Error::Bus)?;

        for &axis in &buf[..3] {
            if (axis >> 6) & 0x01 == 1 {
                return Err(Error::NotReady);
            }
        }
        let tilt = buf[3];
        if tilt & (1 << 6) != 0 {
            return Err(Error::NotReady);
        }

        self.state = State {
            x: sign_extend_6bit(buf[0]),
            y: sign_extend_6bit(buf[1]),
            z: sign_extend_6bit(buf[2]),
            front: tilt & (1 << 0) != 0,
            back: tilt & (1 << 1) != 0,
            position: Position::from_tilt(tilt),
            tapped: tilt & (1 << 5) != 0,
            shaken: tilt & (1 << 7) != 0,
        };
        Ok(())
    }

    fn write_reg(&mut self, r: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(ADDRESS, &[r, value]).map_err(Error::Bus)
    }
}

impl<I2C> Device for Mma7660<I2C>
where
    I2C: I2cBus,
{
    type Error = Error<I2C::Error>;

    fn close(mut self) -> Result<(), Self::Error> {
        // Best-effort standby before releasing the bus
        let _ = self.set_mode(Mode::Standby);
        Ok(())
    }
}

impl<I2C> Update for Mma7660<I2C>
where
    I2C: I2cBus,
{
    fn update(&mut self) -> Result<(), Self::Error> {
        Mma7660::update(self)
    }
}

/// Sign-extend a 6-bit two's-complement count
fn sign_extend_6bit(raw: u8) -> i8 {
    ((raw << 2) as i8) >> 2
}
