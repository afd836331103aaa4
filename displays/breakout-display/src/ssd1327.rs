//! SSD1327 grayscale OLED driver
//!
//! Driver for the Grove 96x96 OLED, a 4-bit grayscale panel behind an
//! SSD1327 controller. The Grove wire protocol sends every command byte
//! as its own `[0x80, byte]` write; pixel data goes out as `0x40`
//! prefixed chunks.
//!
//! Bitmaps are drawn from a 1-bit source image: each source bit expands
//! to a 4-bit gray nibble chosen by [`Ssd1327::set_gray_level`].

use breakout_hal::{Device, Error, I2cBus};
use embedded_hal::delay::DelayNs;

/// I2C address of the device
pub const ADDRESS: u8 = 0x3C;

/// Display dimensions
pub const WIDTH: usize = 96;
pub const HEIGHT: usize = 96;

/// One panel refresh worth of pixel data, two 4-bit pixels per byte
const FRAME_BYTES: usize = WIDTH * HEIGHT / 2;

/// Bytes in a 1-bit source bitmap covering the full panel
pub const BITMAP_BYTES: usize = WIDTH * HEIGHT / 8;

/// Pixel data bytes per chunked write
const CHUNK: usize = 64;

/// SSD1327 commands
mod cmd {
    pub const COMMAND_MODE: u8 = 0x80;
    pub const DATA_MODE: u8 = 0x40;
    pub const SET_COLUMN_ADDR: u8 = 0x15;
    pub const SET_ROW_ADDR: u8 = 0x75;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_REMAP: u8 = 0xA0;
    pub const SET_START_LINE: u8 = 0xA1;
    pub const SET_DISPLAY_OFFSET: u8 = 0xA2;
    pub const SET_NORMAL: u8 = 0xA4;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_VDD_INTERNAL: u8 = 0xAB;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_PHASE_LENGTH: u8 = 0xB1;
    pub const SET_CLOCK_DIV: u8 = 0xB3;
    pub const SET_SECOND_PRECHARGE: u8 = 0xB6;
    pub const SET_LINEAR_GRAY_TABLE: u8 = 0xB9;
    pub const SET_PRECHARGE_VOLTAGE: u8 = 0xBC;
    pub const SET_VCOMH: u8 = 0xBE;
    pub const SET_PRECHARGE_VSL: u8 = 0xD5;
    pub const SET_LOCK: u8 = 0xFD;
    pub const LEFT_HORIZONTAL_SCROLL: u8 = 0x27;
    pub const RIGHT_HORIZONTAL_SCROLL: u8 = 0x26;
    pub const ACTIVATE_SCROLL: u8 = 0x2F;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
}

/// Remap setting for vertical address increment
const REMAP_VERTICAL: u8 = 0x46;
/// Remap setting for horizontal address increment
const REMAP_HORIZONTAL: u8 = 0x42;

/// First driver IC column used by the 96-pixel panel
const COLUMN_OFFSET: u8 = 0x08;

/// Horizontal scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollDirection {
    Left,
    Right,
}

/// Scroll step interval in frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ScrollSpeed {
    Frames2 = 0x7,
    Frames3 = 0x4,
    Frames4 = 0x5,
    Frames5 = 0x0,
    Frames25 = 0x6,
    Frames64 = 0x1,
    Frames128 = 0x2,
    Frames256 = 0x3,
}

/// SSD1327 grayscale OLED driver
pub struct Ssd1327<I2C, D> {
    i2c: I2C,
    delay: D,
    gray_h: u8,
    gray_l: u8,
}

impl<I2C, D> Ssd1327<I2C, D>
where
    I2C: I2cBus,
    D: DelayNs,
{
    /// Open the display, run the panel init sequence, and blank it
    pub fn open(i2c: I2C, delay: D) -> Result<Self, Error<I2C::Error>> {
        let mut display = Self {
            i2c,
            delay,
            gray_h: 0xF0,
            gray_l: 0x0F,
        };
        // Accept commands
        display.commands(&[cmd::SET_LOCK, 0x12])?;
        display.off()?;
        display.commands(&[cmd::SET_MUX_RATIO, (HEIGHT - 1) as u8])?;
        display.commands(&[cmd::SET_START_LINE, 0x00])?;
        display.commands(&[cmd::SET_DISPLAY_OFFSET, 0x60])?;
        display.vertical_mode()?;
        display.commands(&[cmd::SET_VDD_INTERNAL, 0x01])?;
        display.set_contrast(100)?;
        display.commands(&[cmd::SET_PHASE_LENGTH, 0x51])?;
        display.commands(&[cmd::SET_CLOCK_DIV, 0x01])?;
        display.commands(&[cmd::SET_LINEAR_GRAY_TABLE])?;
        display.commands(&[cmd::SET_PRECHARGE_VOLTAGE, 0x08])?;
        display.commands(&[cmd::SET_VCOMH, 0x07])?;
        display.commands(&[cmd::SET_SECOND_PRECHARGE, 0x01])?;
        display.commands(&[cmd::SET_PRECHARGE_VSL, 0x62])?;
        display.normal()?;
        display.disable_scroll()?;
        display.on()?;
        display.delay.delay_ms(100);
        display.commands(&[cmd::SET_ROW_ADDR, 0x00, (HEIGHT - 1) as u8])?;
        display.commands(&[cmd::SET_COLUMN_ADDR, COLUMN_OFFSET, 0x37])?;
        display.clear()?;
        display.normal()?;
        display.vertical_mode()?;
        display.set_cursor(0, 0)?;
        Ok(display)
    }

    /// Turn the panel on
    pub fn on(&mut self) -> Result<(), Error<I2C::Error>> {
        self.commands(&[cmd::DISPLAY_ON])
    }

    /// Turn the panel off
    pub fn off(&mut self) -> Result<(), Error<I2C::Error>> {
        self.commands(&[cmd::DISPLAY_OFF])
    }

    /// Show pixel data as written
    pub fn normal(&mut self) -> Result<(), Error<I2C::Error>> {
        self.commands(&[cmd::SET_NORMAL])
    }

    /// Show pixel data inverted
    pub fn inverse(&mut self) -> Result<(), Error<I2C::Error>> {
        self.commands(&[cmd::SET_INVERSE])
    }

    /// Set the contrast, 0-255
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), Error<I2C::Error>> {
        self.commands(&[cmd::SET_CONTRAST, contrast])
    }

    /// Switch to horizontal address increment and reset the address
    /// window to the full panel
    pub fn horizontal_mode(&mut self) -> Result<(), Error<I2C::Error>> {
        self.commands(&[cmd::SET_REMAP, REMAP_HORIZONTAL])?;
        self.commands(&[cmd::SET_ROW_ADDR, 0x00, (HEIGHT - 1) as u8])?;
        self.commands(&[cmd::SET_COLUMN_ADDR, COLUMN_OFFSET, 0x37])
    }

    /// Switch to vertical address increment
    pub fn vertical_mode(&mut self) -> Result<(), Error<I2C::Error>> {
        self.commands(&[cmd::SET_REMAP, REMAP_VERTICAL])
    }

    /// Move the write window to a cell of the 12x12 text grid
    pub fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Error<I2C::Error>> {
        if row > 11 || col > 11 {
            return Err(Error::OutOfRange);
        }
        self.commands(&[cmd::SET_COLUMN_ADDR, COLUMN_OFFSET + col * 4, 0x37])?;
        self.commands(&[cmd::SET_ROW_ADDR, row * 8, row * 8 + 7])
    }

    /// Blank the whole panel
    pub fn clear(&mut self) -> Result<(), Error<I2C::Error>> {
        let zeros = [0u8; CHUNK];
        for _ in 0..FRAME_BYTES / CHUNK {
            self.data(&zeros)?;
        }
        Ok(())
    }

    /// Pick the gray nibble (0-15) used for set bits in bitmap drawing
    pub fn set_gray_level(&mut self, level: u8) {
        self.gray_h = (level << 4) & 0xF0;
        self.gray_l = level & 0x0F;
    }

    /// Expand a full-panel 1-bit bitmap to gray nibbles and push it
    ///
    /// Bits are consumed least significant first; each bit pair becomes
    /// one output byte of two pixels. Leaves the panel in horizontal
    /// address mode.
    pub fn draw_bitmap(&mut self, bitmap: &[u8; BITMAP_BYTES]) -> Result<(), Error<I2C::Error>> {
        self.horizontal_mode()?;
        let mut chunk = [0u8; CHUNK];
        let mut filled = 0;
        for &b in bitmap {
            for j in (0..8).step_by(2) {
                let mut c = 0x00;
                if (b >> j) & 0x01 != 0 {
                    c |= self.gray_h;
                }
                if (b >> (j + 1)) & 0x01 != 0 {
                    c |= self.gray_l;
                }
                chunk[filled] = c;
                filled += 1;
                if filled == CHUNK {
                    self.data(&chunk)?;
                    filled = 0;
                }
            }
        }
        Ok(())
    }

    /// Program a horizontal scroll over the row and column ranges, both
    /// bounds inclusive
    pub fn setup_scroll(
        &mut self,
        direction: ScrollDirection,
        start_row: u8,
        end_row: u8,
        start_col: u8,
        end_col: u8,
        speed: ScrollSpeed,
    ) -> Result<(), Error<I2C::Error>> {
        if start_row > end_row || end_row > 127 || start_col > end_col || end_col > 63 {
            return Err(Error::OutOfRange);
        }
        let scroll = match direction {
            ScrollDirection::Left => cmd::LEFT_HORIZONTAL_SCROLL,
            ScrollDirection::Right => cmd::RIGHT_HORIZONTAL_SCROLL,
        };
        self.commands(&[
            scroll,
            0x00,
            start_row,
            speed as u8,
            end_row,
            start_col + COLUMN_OFFSET,
            end_col + COLUMN_OFFSET,
            0x00,
        ])
    }

    /// Start the programmed scroll
    pub fn enable_scroll(&mut self) -> Result<(), Error<I2C::Error>> {
        self.commands(&[cmd::ACTIVATE_SCROLL])
    }

    /// Stop scrolling
    pub fn disable_scroll(&mut self) -> Result<(), Error<I2C::Error>> {
        self.commands(&[cmd::DEACTIVATE_SCROLL])
    }

    fn commands(&mut self, bytes: &[u8]) -> Result<(), Error<I2C::Error>> {
        for &b in bytes {
            self.i2c
                .write(ADDRESS, &[cmd::COMMAND_MODE, b])
                .map_err(Error::Bus)?;
        }
        Ok(())
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), Error<I2C::Error>> {
        let mut buf = [0u8; CHUNK + 1];
        buf[0] = cmd::DATA_MODE;
        buf[1..1 + bytes.len()].copy_from_slice(bytes);
        self.i2c
            .write(ADDRESS, &buf[..1 + bytes.len()])
            .map_err(Error::Bus)
    }
}

impl<I2C, D> Device for Ssd1327<I2C, D>
where
    I2C: I2cBus,
    D: DelayNs,
{
    type Error = Error<I2C::Error>;

    fn close(mut self) -> Result<(), Self::Error> {
        // Best-effort panel off
        let _ = self.off();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeI2c, NoopDelay, RecordingDelay};

    /// Command frames emitted by open: the init chain, the address
    /// windows, and the post-clear reset
    const INIT_CMD_FRAMES: usize = 46;
    /// Data frames emitted by the clear inside open
    const CLEAR_FRAMES: usize = FRAME_BYTES / CHUNK;
    const INIT_LEN: usize = INIT_CMD_FRAMES * 2 + CLEAR_FRAMES * (CHUNK + 1);

    #[test]
    fn test_init_sequence() {
        let mut i2c = FakeI2c::new();
        let display = Ssd1327::open(&mut i2c, RecordingDelay::new()).unwrap();
        assert_eq!(display.delay.total_ns, 100_000_000);
        assert_eq!(display.gray_h, 0xF0);
        assert_eq!(display.gray_l, 0x0F);
        drop(display);
        assert_eq!(i2c.written.len(), INIT_LEN);
        assert_eq!(i2c.frames.len(), INIT_CMD_FRAMES + CLEAR_FRAMES);
        // Unlock comes first, one command byte per frame
        assert_eq!(&i2c.written[..6], &[0x80, 0xFD, 0x80, 0x12, 0x80, 0xAE]);
        // Every clear chunk is data-prefixed zeros
        let clear = &i2c.written[37 * 2..37 * 2 + CLEAR_FRAMES * (CHUNK + 1)];
        for chunk in clear.chunks(CHUNK + 1) {
            assert_eq!(chunk[0], 0x40);
            assert!(chunk[1..].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_set_cursor() {
        let mut i2c = FakeI2c::new();
        let mut display = Ssd1327::open(&mut i2c, NoopDelay).unwrap();
        display.set_cursor(2, 3).unwrap();
        assert_eq!(display.set_cursor(12, 0), Err(Error::OutOfRange));
        assert_eq!(display.set_cursor(0, 12), Err(Error::OutOfRange));
        drop(display);
        let sent = &i2c.written[INIT_LEN..];
        assert_eq!(
            sent,
            &[
                0x80, 0x15, 0x80, 0x08 + 3 * 4, 0x80, 0x37, // column window
                0x80, 0x75, 0x80, 16, 0x80, 23, // row window
            ]
        );
    }

    #[test]
    fn test_draw_bitmap_expands_bits() {
        let mut i2c = FakeI2c::new();
        let mut display = Ssd1327::open(&mut i2c, NoopDelay).unwrap();
        let mut bitmap = [0u8; BITMAP_BYTES];
        bitmap[0] = 0b0000_0111;
        display.draw_bitmap(&bitmap).unwrap();
        drop(display);
        // Horizontal mode plus windows is 8 command frames
        let data = &i2c.written[INIT_LEN + 8 * 2..];
        assert_eq!(data.len(), CLEAR_FRAMES * (CHUNK + 1));
        assert_eq!(data[0], 0x40);
        // Bits 0+1 set, bit 2 set, bit 3 clear
        assert_eq!(data[1], 0xFF);
        assert_eq!(data[2], 0xF0);
        assert_eq!(data[3], 0x00);
    }

    #[test]
    fn test_gray_level_shapes_output() {
        let mut i2c = FakeI2c::new();
        let mut display = Ssd1327::open(&mut i2c, NoopDelay).unwrap();
        display.set_gray_level(0x5);
        let mut bitmap = [0u8; BITMAP_BYTES];
        bitmap[0] = 0b0000_0011;
        display.draw_bitmap(&bitmap).unwrap();
        drop(display);
        let data = &i2c.written[INIT_LEN + 8 * 2..];
        assert_eq!(data[1], 0x55);
    }

    #[test]
    fn test_scroll_setup() {
        let mut i2c = FakeI2c::new();
        let mut display = Ssd1327::open(&mut i2c, NoopDelay).unwrap();
        assert_eq!(
            display.setup_scroll(ScrollDirection::Left, 10, 5, 0, 63, ScrollSpeed::Frames2),
            Err(Error::OutOfRange)
        );
        assert_eq!(
            display.setup_scroll(ScrollDirection::Left, 0, 95, 0, 64, ScrollSpeed::Frames2),
            Err(Error::OutOfRange)
        );
        display
            .setup_scroll(ScrollDirection::Right, 0, 95, 0, 63, ScrollSpeed::Frames25)
            .unwrap();
        display.enable_scroll().unwrap();
        drop(display);
        let sent = &i2c.written[INIT_LEN..];
        assert_eq!(
            sent,
            &[
                0x80, 0x26, 0x80, 0x00, 0x80, 0, 0x80, 0x6, 0x80, 95, 0x80, 0x08, 0x80, 63 + 8,
                0x80, 0x00, 0x80, 0x2F,
            ]
        );
    }

    #[test]
    fn test_close_turns_panel_off() {
        let mut i2c = FakeI2c::new();
        let display = Ssd1327::open(&mut i2c, NoopDelay).unwrap();
        display.close().unwrap();
        assert_eq!(&i2c.written[INIT_LEN..], &[0x80, cmd::DISPLAY_OFF]);
    }
}
