//! In-memory bus fake for host tests
//!
//! Displays are write-only, so the fake only records traffic: a
//! flattened byte log of every write plus one `(address, length)` frame
//! per transaction. The frame list lets tests tell the two controllers
//! of the JHD1313 apart and check transaction boundaries.

use embedded_hal::i2c::{self, Operation};
use heapless::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeBusError;

impl i2c::Error for FakeBusError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

pub struct FakeI2c {
    /// Flattened data bytes of every write, in order
    pub written: Vec<u8, 16384>,
    /// Target address and byte count of each transaction
    pub frames: Vec<(u8, u16), 1024>,
    /// Fail every transaction when set
    pub fail: bool,
}

impl FakeI2c {
    pub fn new() -> Self {
        Self {
            written: Vec::new(),
            frames: Vec::new(),
            fail: false,
        }
    }
}

impl i2c::ErrorType for FakeI2c {
    type Error = FakeBusError;
}

impl i2c::I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail {
            return Err(FakeBusError);
        }
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    self.written.extend_from_slice(bytes).unwrap();
                    self.frames.push((address, bytes.len() as u16)).unwrap();
                }
                Operation::Read(buf) => {
                    buf.fill(0);
                }
            }
        }
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

pub struct NoopDelay;

impl embedded_hal::delay::DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
