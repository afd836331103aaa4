//! JHD1313 character LCD driver
//!
//! The Grove RGB backlight LCD is a 16x2 HD44780-class panel wired as
//! two I2C peripherals on one bus: the JHD1313 text controller at 0x3E
//! and a PCA9633 backlight controller at 0x62. Text commands go out as
//! `[0x80, cmd]`, character data as `[0x40, byte]`, and backlight
//! registers as plain `[reg, value]` writes.

use breakout_hal::{Device, Error, I2cBus};
use embedded_hal::delay::DelayNs;

/// I2C address of the text controller
pub const LCD_ADDRESS: u8 = 0x3E;
/// I2C address of the backlight controller
pub const RGB_ADDRESS: u8 = 0x62;

/// Character cells per display line
pub const COLS: u8 = 16;
/// Display lines
pub const ROWS: u8 = 2;

/// HD44780 command set
mod cmd {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const RETURN_HOME: u8 = 0x02;
    pub const ENTRY_MODE_SET: u8 = 0x04;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const CURSOR_SHIFT: u8 = 0x10;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const SET_CGRAM_ADDR: u8 = 0x40;
    pub const SET_DDRAM_ADDR: u8 = 0x80;

    pub const ENTRY_LEFT: u8 = 0x02;
    pub const DISPLAY_ON: u8 = 0x04;
    pub const DISPLAY_MOVE: u8 = 0x08;
    pub const MOVE_RIGHT: u8 = 0x04;
    pub const MOVE_LEFT: u8 = 0x00;
    pub const TWO_LINE: u8 = 0x08;

    pub const SECOND_LINE_OFFSET: u8 = 0x40;
}

/// Backlight controller registers
mod reg {
    pub const MODE1: u8 = 0x00;
    pub const MODE2: u8 = 0x01;
    pub const LED_OUT: u8 = 0x08;
    pub const BLUE: u8 = 0x02;
    pub const GREEN: u8 = 0x03;
    pub const RED: u8 = 0x04;
}

/// Direction the displayed text shifts in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollDirection {
    Left,
    Right,
}

/// JHD1313 character LCD with RGB backlight
pub struct Jhd1313<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C, D> Jhd1313<I2C, D>
where
    I2C: I2cBus,
    D: DelayNs,
{
    /// Open the display, configure both controllers, and light the
    /// backlight white
    pub fn open(i2c: I2C, delay: D) -> Result<Self, Error<I2C::Error>> {
        let mut display = Self { i2c, delay };
        display.delay.delay_ms(50);
        display.command(cmd::FUNCTION_SET | cmd::TWO_LINE)?;
        display.delay.delay_ms(100);
        display.command(cmd::DISPLAY_CONTROL | cmd::DISPLAY_ON)?;
        display.delay.delay_ms(100);
        display.clear()?;
        display.command(cmd::ENTRY_MODE_SET | cmd::ENTRY_LEFT)?;
        // Backlight controller out of sleep, PWM on every channel
        display.set_reg(reg::MODE1, 0x01)?;
        display.set_reg(reg::MODE2, 0x00)?;
        display.set_reg(reg::LED_OUT, 0xAA)?;
        display.set_rgb(255, 255, 255)?;
        Ok(display)
    }

    /// Set the backlight color
    pub fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), Error<I2C::Error>> {
        self.set_reg(reg::RED, r)?;
        self.set_reg(reg::GREEN, g)?;
        self.set_reg(reg::BLUE, b)
    }

    /// Erase all text
    pub fn clear(&mut self) -> Result<(), Error<I2C::Error>> {
        self.command(cmd::CLEAR_DISPLAY)
    }

    /// Move the cursor back to the top left corner
    pub fn home(&mut self) -> Result<(), Error<I2C::Error>> {
        self.command(cmd::RETURN_HOME)?;
        // The controller needs a beat after home before the next command
        self.delay.delay_ms(2);
        Ok(())
    }

    /// Print text at the cursor
    ///
    /// A newline jumps to the start of the second line. Only the ASCII
    /// subset of the HD44780 character ROM is addressable.
    pub fn write_str(&mut self, text: &str) -> Result<(), Error<I2C::Error>> {
        // A fresh clear needs a moment before data arrives
        self.delay.delay_ms(1);
        for &b in text.as_bytes() {
            if b == b'\n' {
                self.set_position(COLS)?;
                continue;
            }
            self.data(b)?;
        }
        Ok(())
    }

    /// Move the cursor: 0..=15 on the first line, 16..=31 on the second
    pub fn set_position(&mut self, pos: u8) -> Result<(), Error<I2C::Error>> {
        if pos >= COLS * ROWS {
            return Err(Error::OutOfRange);
        }
        let mut offset = pos;
        if pos >= COLS {
            offset = (pos - COLS) | cmd::SECOND_LINE_OFFSET;
        }
        self.command(cmd::SET_DDRAM_ADDR | offset)
    }

    /// Shift the displayed text one cell
    pub fn scroll(&mut self, direction: ScrollDirection) -> Result<(), Error<I2C::Error>> {
        let shift = match direction {
            ScrollDirection::Left => cmd::MOVE_LEFT,
            ScrollDirection::Right => cmd::MOVE_RIGHT,
        };
        self.command(cmd::CURSOR_SHIFT | cmd::DISPLAY_MOVE | shift)
    }

    /// Program one of the eight CGRAM characters, usable afterwards by
    /// printing the byte value `pos`
    pub fn set_custom_char(&mut self, pos: u8, pattern: [u8; 8]) -> Result<(), Error<I2C::Error>> {
        if pos > 7 {
            return Err(Error::OutOfRange);
        }
        self.command(cmd::SET_CGRAM_ADDR | (pos << 3))?;
        let mut buf = [0u8; 9];
        buf[0] = 0x40;
        buf[1..].copy_from_slice(&pattern);
        self.i2c.write(LCD_ADDRESS, &buf).map_err(Error::Bus)
    }

    fn command(&mut self, c: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(LCD_ADDRESS, &[0x80, c]).map_err(Error::Bus)
    }

    fn data(&mut self, b: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(LCD_ADDRESS, &[0x40, b]).map_err(Error::Bus)
    }

    fn set_reg(&mut self, r: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(RGB_ADDRESS, &[r, value]).map_err(Error::Bus)
    }
}

impl<I2C, D> Device for Jhd1313<I2C, D>
where
    I2C: I2cBus,
    D: DelayNs,
{
    type Error = Error<I2C::Error>;

    fn close(mut self) -> Result<(), Self::Error> {
        // Best-effort blank screen and dark backlight
        let _ = self.clear();
        let _ = self.set_rgb(0, 0, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeI2c, NoopDelay, RecordingDelay};

    /// Log bytes produced by open
    const INIT_LEN: usize = 10 * 2;

    #[test]
    fn test_init_sequence() {
        let mut i2c = FakeI2c::new();
        let display = Jhd1313::open(&mut i2c, RecordingDelay::new()).unwrap();
        assert_eq!(display.delay.total_ns, 250_000_000);
        drop(display);
        assert_eq!(
            &i2c.written[..],
            &[
                0x80, 0x28, // function set, two lines
                0x80, 0x0C, // display on
                0x80, 0x01, // clear
                0x80, 0x06, // entry mode
                0x00, 0x01, 0x01, 0x00, 0x08, 0xAA, // backlight wakeup
                0x04, 255, 0x03, 255, 0x02, 255, // white
            ]
        );
        let addrs: heapless::Vec<u8, 16> = i2c.frames.iter().map(|&(a, _)| a).collect();
        assert_eq!(
            &addrs[..],
            &[0x3E, 0x3E, 0x3E, 0x3E, 0x62, 0x62, 0x62, 0x62, 0x62, 0x62]
        );
    }

    #[test]
    fn test_write_str_with_newline() {
        let mut i2c = FakeI2c::new();
        let mut display = Jhd1313::open(&mut i2c, NoopDelay).unwrap();
        display.write_str("Hi\nYo").unwrap();
        drop(display);
        assert_eq!(
            &i2c.written[INIT_LEN..],
            &[
                0x40, b'H', 0x40, b'i',
                0x80, 0xC0, // cursor to second line
                0x40, b'Y', 0x40, b'o',
            ]
        );
    }

    #[test]
    fn test_set_position() {
        let mut i2c = FakeI2c::new();
        let mut display = Jhd1313::open(&mut i2c, NoopDelay).unwrap();
        assert_eq!(display.set_position(32), Err(Error::OutOfRange));
        display.set_position(5).unwrap();
        display.set_position(20).unwrap();
        drop(display);
        assert_eq!(&i2c.written[INIT_LEN..], &[0x80, 0x85, 0x80, 0xC4]);
    }

    #[test]
    fn test_scroll() {
        let mut i2c = FakeI2c::new();
        let mut display = Jhd1313::open(&mut i2c, NoopDelay).unwrap();
        display.scroll(ScrollDirection::Left).unwrap();
        display.scroll(ScrollDirection::Right).unwrap();
        drop(display);
        assert_eq!(&i2c.written[INIT_LEN..], &[0x80, 0x18, 0x80, 0x1C]);
    }

    #[test]
    fn test_custom_char() {
        let mut i2c = FakeI2c::new();
        let mut display = Jhd1313::open(&mut i2c, NoopDelay).unwrap();
        assert_eq!(
            display.set_custom_char(8, [0; 8]),
            Err(Error::OutOfRange)
        );
        let heart = [0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00, 0x00];
        display.set_custom_char(2, heart).unwrap();
        drop(display);
        let sent = &i2c.written[INIT_LEN..];
        assert_eq!(&sent[..2], &[0x80, 0x40 | (2 << 3)]);
        assert_eq!(sent[2], 0x40);
        assert_eq!(&sent[3..], &heart);
    }

    #[test]
    fn test_home_waits() {
        let mut i2c = FakeI2c::new();
        let mut display = Jhd1313::open(&mut i2c, RecordingDelay::new()).unwrap();
        let before = display.delay.total_ns;
        display.home().unwrap();
        assert_eq!(display.delay.total_ns - before, 2_000_000);
        drop(display);
        assert_eq!(&i2c.written[INIT_LEN..], &[0x80, 0x02]);
    }

    #[test]
    fn test_close_blanks_everything() {
        let mut i2c = FakeI2c::new();
        let display = Jhd1313::open(&mut i2c, NoopDelay).unwrap();
        display.close().unwrap();
        assert_eq!(
            &i2c.written[INIT_LEN..],
            &[0x80, 0x01, 0x04, 0, 0x03, 0, 0x02, 0]
        );
    }
}
