//! In-memory bus fakes for host tests
//!
//! The fakes implement the embedded-hal 1.0 bus traits, so driver tests
//! also go through the breakout-hal bridge impls. `FakeI2c` keeps a
//! 256-byte register image: register reads answer from it, plain writes
//! land in it starting at the register named by the first byte and are
//! appended to a flattened log so tests can assert exact wire traffic.
//! Register-select writes (the write half of a write-read) are not
//! logged.

use embedded_hal::i2c::{self, Operation};
use embedded_hal::spi;
use heapless::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeBusError;

impl i2c::Error for FakeBusError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

impl spi::Error for FakeBusError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

#[derive(Debug)]
pub struct FakeI2c {
    pub mem: [u8; 256],
    /// Flattened data bytes of every plain write, in order
    pub written: Vec<u8, 2048>,
    /// Fail every transaction when set
    pub fail: bool,
}

impl FakeI2c {
    pub fn new() -> Self {
        Self {
            mem: [0; 256],
            written: Vec::new(),
            fail: false,
        }
    }

    pub fn load(&mut self, reg: u8, bytes: &[u8]) {
        let start = reg as usize;
        self.mem[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

impl i2c::ErrorType for FakeI2c {
    type Error = FakeBusError;
}

impl i2c::I2c for FakeI2c {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail {
            return Err(FakeBusError);
        }
        let has_read = operations.iter().any(|op| matches!(op, Operation::Read(_)));
        let mut select: Option<u8> = None;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if !has_read {
                        self.written.extend_from_slice(bytes).unwrap();
                        if let Some((&reg, rest)) = bytes.split_first() {
                            for (i, &b) in rest.iter().enumerate() {
                                self.mem[reg as usize + i] = b;
                            }
                        }
                    }
                    select = bytes.first().copied();
                }
                Operation::Read(buf) => {
                    let reg = select.take().unwrap_or(0) as usize;
                    buf.copy_from_slice(&self.mem[reg..reg + buf.len()]);
                }
            }
        }
        Ok(())
    }
}

pub struct FakeSpi {
    pub written: Vec<u8, 2048>,
}

impl FakeSpi {
    pub fn new() -> Self {
        Self {
            written: Vec::new(),
        }
    }
}

impl spi::ErrorType for FakeSpi {
    type Error = FakeBusError;
}

impl spi::SpiBus<u8> for FakeSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.written.extend_from_slice(words).unwrap();
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.written.extend_from_slice(write).unwrap();
        read.fill(0);
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.written.extend_from_slice(words).unwrap();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Delay that returns immediately but remembers the total requested time
pub struct RecordingDelay {
    pub total_ns: u64,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self { total_ns: 0 }
    }
}

impl embedded_hal::delay::DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

#[derive(Debug)]
pub struct NoopDelay;

impl embedded_hal::delay::DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
