//! APA102 "DotStar" LED strip
//!
//! SPI driver for strips of APA102/SK9822 LEDs. Colors are staged in
//! memory with [`Apa102::set`] and pushed to the strip in one go with
//! [`Apa102::show`]. The strip wants SPI mode 3 ([`SPI_MODE`]) and
//! 8-bit words.
//!
//! Wire format per the datasheet: a 32-bit zero start frame, then one
//! 4-byte frame per LED (`111` marker + 5-bit global brightness, then
//! blue, green, red), then enough trailing one-bits to clock the data
//! through the whole chain (half a bit per LED).

use breakout_hal::{spi::Mode, Device, Error, SpiBus, Update};
use smart_leds::RGB8;

/// Required SPI clock mode (CPOL=1, CPHA=1)
pub const SPI_MODE: Mode = Mode::Mode3;

/// Per-LED frame marker bits
const FRAME_MARKER: u8 = 0xE0;

/// One staged LED value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Led {
    /// Color
    pub color: RGB8,
    /// Global brightness, 0..=31 (higher bits are ignored)
    pub brightness: u8,
}

impl Led {
    /// A color at full brightness
    pub fn new(color: RGB8) -> Self {
        Self {
            color,
            brightness: 0x1F,
        }
    }
}

/// A strip of N APA102 LEDs
pub struct Apa102<SPI, const N: usize> {
    spi: SPI,
    leds: [Led; N],
}

impl<SPI, const N: usize> Apa102<SPI, N>
where
    SPI: SpiBus,
{
    /// Open a strip of N LEDs, all staged dark
    pub fn open(spi: SPI) -> Self {
        Self {
            spi,
            leds: [Led::default(); N],
        }
    }

    /// Number of LEDs in the strip
    pub fn len(&self) -> usize {
        N
    }

    /// Whether the strip has zero LEDs
    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// Stage the ith LED's value; [`Self::show`] transmits it
    pub fn set(&mut self, i: usize, led: Led) -> Result<(), Error<SPI::Error>> {
        if i >= N {
            return Err(Error::OutOfRange);
        }
        self.leds[i] = led;
        Ok(())
    }

    /// Transmit the staged values to the strip
    pub fn show(&mut self) -> Result<(), Error<SPI::Error>> {
        self.spi.write(&[0x00; 4]).map_err(Error::Bus)?;
        for led in &self.leds {
            let frame = [
                FRAME_MARKER | (led.brightness & 0x1F),
                led.color.b,
                led.color.g,
                led.color.r,
            ];
            self.spi.write(&frame).map_err(Error::Bus)?;
        }
        // End frame: at least N/2 one-bits to carry the clock through
        let mut trailing = N / 2 + 1;
        while trailing > 0 {
            let chunk = trailing.min(4);
            self.spi.write(&[0xFF; 4][..chunk]).map_err(Error::Bus)?;
            trailing -= chunk;
        }
        Ok(())
    }
}

impl<SPI, const N: usize> Device for Apa102<SPI, N>
where
    SPI: SpiBus,
{
    type Error = Error<SPI::Error>;

    fn close(mut self) -> Result<(), Self::Error> {
        // Best effort: leave the strip dark
        self.leds = [Led::default(); N];
        let _ = self.show();
        Ok(())
    }
}

impl<SPI, const N: usize> Update for Apa102<SPI, N>
where
    SPI: SpiBus,
{
    fn update(&mut self) -> Result<(), Self::Error> {
        self.show()
    }
}
