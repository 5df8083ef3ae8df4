//! Humidity/temperature sensor trait

use crate::error::Error;
use crate::measurement::{Measurement, Query};

/// Trait for combined humidity/temperature sensors
///
/// A measurement is split in two calls: [`trigger`](Self::trigger) starts a
/// conversion and remembers the query, [`read`](Self::read) waits for it and
/// decodes the result according to that query. Only one measurement is in
/// flight at a time.
pub trait HumiditySensor {
    /// Bring the sensor to a calibrated, ready state
    fn init(&mut self) -> Result<(), Error>;

    /// Start a measurement for `query`
    fn trigger(&mut self, query: Query) -> Result<(), Error>;

    /// Wait for the pending measurement and decode it
    fn read(&mut self) -> Result<Measurement, Error>;

    /// Soft-reset the sensor and initialize it again
    fn reset(&mut self) -> Result<(), Error>;
}
