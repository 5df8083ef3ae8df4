//! I2C bus abstractions
//!
//! Provides the master-side transmit/receive contract used by the sensor
//! and display drivers. The bus timeout is fixed and owned by the
//! implementation.

use core::cell::RefCell;

/// Errors reported by an I2C bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Master transmit failed (NACK, arbitration, timeout, ...)
    Tx,
    /// Master receive failed
    Rx,
}

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError>;

    /// Read data from a device at the given address
    ///
    /// Fills the whole buffer or fails.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        T::write(self, address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        T::read(self, address, buf)
    }
}

/// Adapter exposing any `embedded-hal` blocking I2C master as an [`I2cBus`]
///
/// Chip HAL errors are collapsed into [`BusError::Tx`] or [`BusError::Rx`]
/// depending on the direction of the failed transfer.
pub struct HalI2c<I2C> {
    i2c: I2C,
}

impl<I2C> HalI2c<I2C> {
    /// Wrap a chip I2C peripheral
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }
}

impl<I2C: embedded_hal::i2c::I2c> I2cBus for HalI2c<I2C> {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        self.i2c.write(address, data).map_err(|_| BusError::Tx)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c.read(address, buf).map_err(|_| BusError::Rx)
    }
}

/// Handle to a bus shared by several drivers on one executor
///
/// Each transfer borrows the bus for its duration only. A transfer that
/// finds the bus already borrowed fails in its own direction.
pub struct SharedI2c<'a, B> {
    bus: &'a RefCell<B>,
}

impl<'a, B> SharedI2c<'a, B> {
    pub fn new(bus: &'a RefCell<B>) -> Self {
        Self { bus }
    }
}

impl<B> Clone for SharedI2c<'_, B> {
    fn clone(&self) -> Self {
        Self { bus: self.bus }
    }
}

impl<B: I2cBus> I2cBus for SharedI2c<'_, B> {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        let mut bus = self.bus.try_borrow_mut().map_err(|_| BusError::Tx)?;
        bus.write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        let mut bus = self.bus.try_borrow_mut().map_err(|_| BusError::Rx)?;
        bus.read(address, buf)
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Transfer timeout in milliseconds
    pub timeout_ms: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz), 1 s timeout
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        timeout_ms: 1000,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Scripted embedded-hal bus that fails every transfer
    struct BrokenBus;

    impl ErrorType for BrokenBus {
        type Error = ErrorKind;
    }

    impl embedded_hal::i2c::I2c for BrokenBus {
        fn transaction(
            &mut self,
            _address: u8,
            _operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    /// Bus that echoes the last written byte on reads
    struct LoopbackBus {
        last: u8,
    }

    impl ErrorType for LoopbackBus {
        type Error = ErrorKind;
    }

    impl embedded_hal::i2c::I2c for LoopbackBus {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                match op {
                    Operation::Write(data) => {
                        if let Some(&b) = data.last() {
                            self.last = b;
                        }
                    }
                    Operation::Read(buf) => buf.fill(self.last),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_errors_keep_direction() {
        let mut bus = HalI2c::new(BrokenBus);
        assert_eq!(bus.write(0x38, &[0x71]), Err(BusError::Tx));

        let mut buf = [0u8; 1];
        assert_eq!(bus.read(0x38, &mut buf), Err(BusError::Rx));
    }

    #[test]
    fn test_adapter_forwards_transfers() {
        let mut bus = HalI2c::new(LoopbackBus { last: 0 });
        bus.write(0x27, &[0x12, 0x34]).unwrap();

        let mut buf = [0u8; 3];
        bus.read(0x27, &mut buf).unwrap();
        assert_eq!(buf, [0x34; 3]);
    }

    #[test]
    fn test_default_is_standard_mode() {
        let config = I2cConfig::default();
        assert_eq!(config.frequency, 100_000);
        assert_eq!(config.timeout_ms, 1000);
    }

    #[test]
    fn test_shared_handles_use_one_bus() {
        let bus = RefCell::new(HalI2c::new(LoopbackBus { last: 0 }));
        let mut sensor = SharedI2c::new(&bus);
        let mut display = sensor.clone();

        sensor.write(0x38, &[0x71]).unwrap();
        let mut buf = [0u8; 1];
        display.read(0x27, &mut buf).unwrap();
        assert_eq!(buf, [0x71]);
    }

    #[test]
    fn test_shared_bus_busy() {
        let bus = RefCell::new(HalI2c::new(LoopbackBus { last: 0 }));
        let mut handle = SharedI2c::new(&bus);
        let _held = bus.borrow_mut();
        assert_eq!(handle.write(0x38, &[0xBA]), Err(BusError::Tx));
    }
}
