//! Factory calibration constants
//!
//! Every BME280 ships with per-part compensation coefficients burned
//! into non-volatile memory: a 26-byte block at 0x88 (temperature and
//! pressure coefficients, with H1 at its tail, register 0xA1) and a
//! 7-byte block at 0xE1 (the remaining humidity coefficients). H4 and
//! H5 are 12-bit two's-complement values sharing register 0xE5: H4
//! takes 0xE4 plus the low nibble of 0xE5, H5 the high nibble of 0xE5
//! plus 0xE6.

/// Per-part compensation coefficients, read once per session and
/// immutable afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,
    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    pub h4: i16,
    pub h5: i16,
    pub h6: i8,
}

impl Calibration {
    /// Decode the two raw register blocks (0x88..=0xA1 and 0xE1..=0xE7)
    ///
    /// All multi-byte fields are little-endian except the packed H4/H5
    /// pair, which is sign-extended from its 12-bit representation.
    pub fn from_blocks(tp: &[u8; 26], h: &[u8; 7]) -> Self {
        Self {
            t1: u16::from_le_bytes([tp[0], tp[1]]),
            t2: i16::from_le_bytes([tp[2], tp[3]]),
            t3: i16::from_le_bytes([tp[4], tp[5]]),
            p1: u16::from_le_bytes([tp[6], tp[7]]),
            p2: i16::from_le_bytes([tp[8], tp[9]]),
            p3: i16::from_le_bytes([tp[10], tp[11]]),
            p4: i16::from_le_bytes([tp[12], tp[13]]),
            p5: i16::from_le_bytes([tp[14], tp[15]]),
            p6: i16::from_le_bytes([tp[16], tp[17]]),
            p7: i16::from_le_bytes([tp[18], tp[19]]),
            p8: i16::from_le_bytes([tp[20], tp[21]]),
            p9: i16::from_le_bytes([tp[22], tp[23]]),
            // tp[24] is register 0xA0, unused padding
            h1: tp[25],
            h2: i16::from_le_bytes([h[0], h[1]]),
            h3: h[2],
            h4: (i16::from(h[3] as i8) << 4) | i16::from(h[4] & 0x0F),
            h5: (i16::from(h[5] as i8) << 4) | i16::from(h[4] >> 4),
            h6: h[6] as i8,
        }
    }
}
