//! SSD1306 monochrome OLED driver
//!
//! Driver for 128x64 SSD1306-based OLED displays via I2C. Pixels are
//! staged in a host-side framebuffer (one bit per pixel, page layout)
//! and pushed to the panel with [`Ssd1306::draw`].

use breakout_hal::{Device, Error, I2cBus, Update};

/// I2C address of the device
pub const ADDRESS: u8 = 0x3C;

/// Display dimensions
pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// Framebuffer length, one leading data-mode control byte plus one bit
/// per pixel
const BUF_LEN: usize = 1 + WIDTH * PAGES;

/// SSD1306 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_SEG_REMAP: u8 = 0xA0;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const RESUME_FROM_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const RIGHT_HORIZONTAL_SCROLL: u8 = 0x26;
    pub const ACTIVATE_SCROLL: u8 = 0x2F;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
}

const INIT_SEQ: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_LOW_COLUMN,
    cmd::SET_HIGH_COLUMN,
    cmd::SET_CLOCK_DIV,
    0x40,
    cmd::SET_MUX_RATIO,
    (HEIGHT - 1) as u8,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14,
    cmd::SET_MEMORY_MODE,
    0x00, // horizontal addressing
    cmd::SET_SEG_REMAP | 0x01,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0x9F,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::RESUME_FROM_RAM,
    cmd::SET_NORMAL,
    cmd::DEACTIVATE_SCROLL,
    cmd::DISPLAY_ON,
];

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    buf: [u8; BUF_LEN],
}

impl<I2C> Ssd1306<I2C>
where
    I2C: I2cBus,
{
    /// Open the display and run the panel init sequence
    pub fn open(i2c: I2C) -> Result<Self, Error<I2C::Error>> {
        let mut buf = [0; BUF_LEN];
        buf[0] = 0x40;
        let mut display = Self { i2c, buf };
        for &c in INIT_SEQ {
            display.command(c)?;
        }
        Ok(display)
    }

    /// Turn the panel on
    pub fn on(&mut self) -> Result<(), Error<I2C::Error>> {
        self.command(cmd::DISPLAY_ON)
    }

    /// Turn the panel off
    pub fn off(&mut self) -> Result<(), Error<I2C::Error>> {
        self.command(cmd::DISPLAY_OFF)
    }

    /// Set the contrast, 0-255
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), Error<I2C::Error>> {
        self.command(cmd::SET_CONTRAST)?;
        self.command(contrast)
    }

    /// Set or clear one framebuffer pixel
    ///
    /// Takes effect on the panel at the next [`Ssd1306::draw`].
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) -> Result<(), Error<I2C::Error>> {
        if x >= WIDTH || y >= HEIGHT {
            return Err(Error::OutOfRange);
        }
        let i = 1 + x + (y / 8) * WIDTH;
        if on {
            self.buf[i] |= 1 << (y & 7);
        } else {
            self.buf[i] &= !(1 << (y & 7));
        }
        Ok(())
    }

    /// Blank the framebuffer and push it to the panel
    pub fn clear(&mut self) -> Result<(), Error<I2C::Error>> {
        self.buf[1..].fill(0);
        self.draw()
    }

    /// Push the framebuffer to the panel
    pub fn draw(&mut self) -> Result<(), Error<I2C::Error>> {
        // Reset the address window to the full panel
        self.command(cmd::SET_COLUMN_ADDR)?;
        self.command(0)?;
        self.command((WIDTH - 1) as u8)?;
        self.command(cmd::SET_PAGE_ADDR)?;
        self.command(0)?;
        self.command((PAGES - 1) as u8)?;
        self.i2c.write(ADDRESS, &self.buf).map_err(Error::Bus)
    }

    /// Scroll the page range horizontally, both bounds inclusive and
    /// at most 7
    pub fn enable_scroll(&mut self, start_page: u8, end_page: u8) -> Result<(), Error<I2C::Error>> {
        if start_page > end_page || end_page >= PAGES as u8 {
            return Err(Error::OutOfRange);
        }
        self.command(cmd::RIGHT_HORIZONTAL_SCROLL)?;
        self.command(0x00)?;
        self.command(start_page)?;
        self.command(0x00)?; // 5-frame interval
        self.command(end_page)?;
        self.command(0x00)?;
        self.command(0xFF)?;
        self.command(cmd::ACTIVATE_SCROLL)
    }

    /// Stop scrolling
    pub fn disable_scroll(&mut self) -> Result<(), Error<I2C::Error>> {
        self.command(cmd::DEACTIVATE_SCROLL)
    }

    fn command(&mut self, c: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(ADDRESS, &[0x00, c]).map_err(Error::Bus)
    }
}

impl<I2C> Device for Ssd1306<I2C>
where
    I2C: I2cBus,
{
    type Error = Error<I2C::Error>;

    fn close(mut self) -> Result<(), Self::Error> {
        // Best-effort panel off
        let _ = self.off();
        Ok(())
    }
}

impl<I2C> Update for Ssd1306<I2C>
where
    I2C: I2cBus,
{
    fn update(&mut self) -> Result<(), Self::Error> {
        self.draw()
    }
}
