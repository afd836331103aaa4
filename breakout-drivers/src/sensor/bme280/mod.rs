//! BME280 environmental sensor
//!
//! Driver for the Bosch BME280 combined temperature, barometric
//! pressure and humidity sensor on I2C.
//!
//! Datasheet: <https://cdn-shop.adafruit.com/datasheets/BST-BME280_DS001-10.pdf>
//!
//! A measurement cycle compensates temperature first; the pressure and
//! humidity formulas consume the temperature path's t_fine carry, and
//! the [`compensation`] signatures enforce that ordering.

pub mod calibration;
pub mod compensation;

use breakout_hal::{Device, Error, I2cBus, Update};
use embedded_hal::delay::DelayNs;

use calibration::Calibration;

/// Default I2C address (SDO low; 0x77 with SDO high)
pub const ADDRESS: u8 = 0x76;

/// Value the chip-identity register must read back
const CHIP_ID: u8 = 0x60;

/// BME280 register addresses
pub mod reg {
    /// Chip identity, reads 0x60
    pub const CHIP_ID: u8 = 0xD0;
    /// Humidity oversampling; takes effect on the next CTRL_MEAS write
    pub const CTRL_HUM: u8 = 0xF2;
    /// Temperature/pressure oversampling and power mode
    pub const CTRL_MEAS: u8 = 0xF4;
    /// Start of the temperature/pressure calibration block (26 bytes)
    pub const CALIB_TP: u8 = 0x88;
    /// Start of the humidity calibration block (7 bytes)
    pub const CALIB_H: u8 = 0xE1;
    /// Raw pressure, 20 bits big-endian in 3 bytes
    pub const PRESS: u8 = 0xF7;
    /// Raw temperature, 20 bits big-endian in 3 bytes
    pub const TEMP: u8 = 0xFA;
    /// Raw humidity, 16 bits big-endian
    pub const HUM: u8 = 0xFD;
}

/// Oversampling level: internal samples averaged per reported reading,
/// trading conversion latency for noise
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    /// Measurement skipped; the output registers read as invalid
    Skip,
    /// 1x
    #[default]
    X1,
    /// 2x
    X2,
    /// 4x
    X4,
    /// 8x
    X8,
    /// 16x
    X16,
}

impl Oversampling {
    /// Every level, in increasing order
    pub const ALL: [Self; 6] = [
        Self::Skip,
        Self::X1,
        Self::X2,
        Self::X4,
        Self::X8,
        Self::X16,
    ];

    /// Register code (0..=5)
    pub const fn bits(self) -> u8 {
        match self {
            Self::Skip => 0,
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X4 => 3,
            Self::X8 => 4,
            Self::X16 => 5,
        }
    }
}

/// Sensor power mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// No measurements, lowest power
    Sleep,
    /// Single measurement, then back to sleep
    Forced,
    /// Free-running measurements
    Normal,
}

impl Mode {
    const fn bits(self) -> u8 {
        match self {
            Self::Sleep => 0,
            Self::Forced => 2,
            Self::Normal => 3,
        }
    }
}

/// CTRL_MEAS register value: osrs_t[7:5] | osrs_p[4:2] | mode[1:0]
pub const fn ctrl_meas(temperature: Oversampling, pressure: Oversampling, mode: Mode) -> u8 {
    (temperature.bits() << 5) | (pressure.bits() << 2) | mode.bits()
}

/// CTRL_HUM register value: osrs_h[2:0]
pub const fn ctrl_hum(humidity: Oversampling) -> u8 {
    humidity.bits()
}

/// Worst-case conversion time in ms for one T+P+H cycle
///
/// From the datasheet maximums, in 1/16 ms units: 1.25 ms startup,
/// 2.3125 ms per oversample unit per channel, plus 0.625 ms setup each
/// for pressure and humidity when they are not skipped. Monotonically
/// non-decreasing in the oversampling level.
pub const fn measure_delay_ms(oversampling: Oversampling) -> u32 {
    let os = oversampling.bits() as u32;
    let setup = if os > 0 { 10 } else { 0 };
    let units = 3 * ((1 << os) >> 1);
    (20 + 37 * units + setup + setup + 15) / 16
}

/// Driver configuration
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// 7-bit I2C address
    pub address: u8,
    /// Oversampling applied to all three channels
    pub oversampling: Oversampling,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: ADDRESS,
            oversampling: Oversampling::X1,
        }
    }
}

/// Published measurement; stale until the first successful update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurements {
    /// Degrees Celsius, 0.01 degC resolution
    pub temperature_c: f32,
    /// Hectopascal
    pub pressure_hpa: f32,
    /// Percent relative humidity
    pub humidity_rh: f32,
}

/// BME280 driver
///
/// Owns its bus handle and delay source for the session lifetime.
#[derive(Debug)]
pub struct Bme280<I2C, D> {
    i2c: I2C,
    delay: D,
    config: Config,
    cal: Calibration,
    measurements: Measurements,
}

impl<I2C, D> Bme280<I2C, D>
where
    I2C: I2cBus,
    D: DelayNs,
{
    /// Open the sensor at the default address with 1x oversampling
    pub fn open(i2c: I2C, delay: D) -> Result<Self, Error<I2C::Error>> {
        Self::open_with_config(i2c, delay, Config::default())
    }

    /// Open the sensor: verify chip identity, then load the factory
    /// calibration block
    pub fn open_with_config(
        mut i2c: I2C,
        delay: D,
        config: Config,
    ) -> Result<Self, Error<I2C::Error>> {
        let mut id = [0u8; 1];
        i2c.write_read(config.address, &[reg::CHIP_ID], &mut id)
            .map_err(Error::Bus)?;
        if id[0] != CHIP_ID {
            return Err(Error::IdMismatch {
                expected: CHIP_ID,
                found: id[0],
            });
        }

        let mut tp = [0u8; 26];
        i2c.write_read(config.address, &[reg::CALIB_TP], &mut tp)
            .map_err(Error::Bus)?;
        let mut h = [0u8; 7];
        i2c.write_read(config.address, &[reg::CALIB_H], &mut h)
            .map_err(Error::Bus)?;

        Ok(Self {
            i2c,
            delay,
            config,
            cal: Calibration::from_blocks(&tp, &h),
            measurements: Measurements::default(),
        })
    }

    /// Last published measurements
    pub fn measurements(&self) -> Measurements {
        self.measurements
    }

    /// The loaded factory calibration
    pub fn calibration(&self) -> &Calibration {
        &self.cal
    }

    /// Trigger a measurement and refresh the published values
    ///
    /// Writes the oversampling/mode registers, waits out the
    /// conversion time, then reads and compensates the raw triplet.
    /// On error the previous values stay published.
    pub fn update(&mut self) -> Result<(), Error<I2C::Error>> {
        let os = self.config.oversampling;
        self.write_reg(reg::CTRL_HUM, ctrl_hum(os))?;
        self.write_reg(reg::CTRL_MEAS, ctrl_meas(os, os, Mode::Normal))?;

        self.delay.delay_ms(measure_delay_ms(os));

        // 20-bit values ride in the top bits of their 3-byte registers
        let adc_t = self.read24(reg::TEMP)? >> 4;
        let adc_p = self.read24(reg::PRESS)? >> 4;
        let adc_h = self.read16(reg::HUM)?;

        // Temperature first: the other two consume this cycle's t_fine
        let (t, t_fine) = compensation::temperature(adc_t, &self.cal);
        let p = compensation::pressure(adc_p, &self.cal, t_fine);
        let h = compensation::humidity(adc_h, &self.cal, t_fine);

        self.measurements = Measurements {
            temperature_c: t as f32 / 100.0,
            pressure_hpa: p as f32 / 256.0 / 100.0,
            humidity_rh: h as f32 / 1024.0,
        };
        Ok(())
    }

    fn write_reg(&mut self, r: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.config.address, &[r, value])
            .map_err(Error::Bus)
    }

    fn read24(&mut self, r: u8) -> Result<i32, Error<I2C::Error>> {
        let mut buf = [0u8; 3];
        self.i2c
            .write_read(self.config.address, &[r], &mut buf)
            .map_err(Error::Bus)?;
        Ok((i32::from(buf[0]) << 16) | (i32::from(buf[1]) << 8) | i32::from(buf[2]))
    }

    fn read16(&mut self, r: u8) -> Result<i32, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.config.address, &[r], &mut buf)
            .map_err(Error::Bus)?;
        Ok((i32::from(buf[0]) << 8) | i32::from(buf[1]))
    }
}

impl<I2C, D> Device for Bme280<I2C, D>
where
    I2C: I2cBus,
    D: DelayNs,
{
    type Error = Error<I2C::Error>;

    fn close(mut self) -> Result<(), Self::Error> {
        // Best-effort transition to the low-power sleep mode
        let os = self.config.oversampling;
        let _ = self.write_reg(reg::CTRL_MEAS, ctrl_meas(os, os, Mode::Sleep));
        Ok(())
    }
}

impl<I2C, D> Update for Bme280<I2C, D>
where
    I2C: I2cBus,
    D: DelayNs,
{
    fn update(&mut self) -> Result<(), Self::Error> {
        Bme280::update(self)
    }
}
