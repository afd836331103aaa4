//! Device lifecycle traits and shared error taxonomy
//!
//! Every driver follows the same session shape: a constructor that opens
//! the bus connection, verifies chip identity where the part has an ID
//! register, and runs the one-time init sequence; zero or more update
//! calls; and an explicit close. Closing consumes the value, so there is
//! no way to call into a closed device.

/// Errors that can occur while talking to a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Underlying bus transaction failed
    Bus(E),
    /// Chip identity register did not match the expected constant
    IdMismatch {
        /// Value the datasheet mandates
        expected: u8,
        /// Value the chip returned
        found: u8,
    },
    /// The sample was captured mid-update; discard it and read again
    NotReady,
    /// Argument outside the device's accepted range, rejected before any I/O
    OutOfRange,
}

/// A bus-attached device session
///
/// Failures during `update`-style calls leave the session usable with its
/// previously published values; retry policy belongs to the caller.
pub trait Device {
    /// Error type, normally [`Error`] over the bus error
    type Error;

    /// End the session, releasing the bus handle
    ///
    /// Devices with a low-power mode transition to standby first, best
    /// effort.
    fn close(self) -> Result<(), Self::Error>;
}

/// Devices that publish refreshed state on demand
///
/// For sensors this triggers a fresh measurement; for buffered displays
/// and LED strips it pushes the in-memory buffer to the hardware.
pub trait Update: Device {
    /// Refresh the device's published state
    fn update(&mut self) -> Result<(), Self::Error>;
}
