//! AHT20 humidity/temperature sensor
//!
//! I2C sensor with 20-bit humidity and temperature readings. A measurement
//! is a trigger command followed, after a settle delay, by a 7-byte frame:
//!
//! ```text
//! byte  0        1        2        3        4        5        6
//!     status   hum[19:12] hum[11:4] hum[3:0]|tmp[19:16] tmp[15:8] tmp[7:0] crc
//! ```
//!
//! The CRC byte is read but not checked.

use embedded_hal::delay::DelayNs;
use hygro_core::error::{Error, SensorError};
use hygro_core::measurement::{Measurement, Query};
use hygro_core::traits::HumiditySensor;
use hygro_hal::I2cBus;

/// Fixed bus address
pub const AHT20_ADDRESS: u8 = 0x38;

/// Sensor commands
pub mod cmd {
    /// Ask for the status byte
    pub const STATUS: [u8; 1] = [0x71];
    /// Load calibration and enter normal mode
    pub const INIT: [u8; 3] = [0xBE, 0x08, 0x00];
    /// Start a measurement
    pub const TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];
    /// Soft reset
    pub const RESET: [u8; 1] = [0xBA];
}

/// Status byte bits
pub mod status {
    /// Calibration loaded, sensor ready for measurements
    pub const CALIBRATED: u8 = 0x08;
    /// Conversion in progress
    pub const BUSY: u8 = 0x80;
}

/// Length of a measurement frame, status and CRC included
pub const FRAME_LEN: usize = 7;

/// Full scale of the 20-bit raw values
const RAW_SCALE: f64 = (1u32 << 20) as f64;

/// AHT20 configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Aht20Config {
    /// I2C address
    pub address: u8,
    /// Wait after power-up before the first command
    pub power_up_ms: u32,
    /// Wait between calibration checks
    pub init_retry_ms: u32,
    /// Wait between trigger and the first status read
    pub settle_ms: u32,
    /// Wait between busy polls
    pub poll_ms: u32,
    /// Init commands sent, and busy re-polls made, before giving up
    pub max_retries: u8,
}

impl Aht20Config {
    /// Datasheet timings
    pub const DATASHEET: Self = Self {
        address: AHT20_ADDRESS,
        power_up_ms: 40,
        init_retry_ms: 10,
        settle_ms: 80,
        poll_ms: 1,
        max_retries: 10,
    };
}

impl Default for Aht20Config {
    fn default() -> Self {
        Self::DATASHEET
    }
}

/// Unscaled values unpacked from a measurement frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawReading {
    /// 20-bit relative humidity
    pub humidity: u32,
    /// 20-bit temperature
    pub temperature: u32,
}

impl RawReading {
    /// Unpack the two 20-bit values from a frame
    pub fn from_frame(frame: &[u8; FRAME_LEN]) -> Self {
        let humidity =
            ((frame[1] as u32) << 12) | ((frame[2] as u32) << 4) | ((frame[3] as u32) >> 4);
        let temperature =
            (((frame[3] & 0x0F) as u32) << 16) | ((frame[4] as u32) << 8) | frame[5] as u32;

        Self {
            humidity,
            temperature,
        }
    }

    /// Relative humidity in percent
    pub fn humidity_percent(&self) -> f64 {
        self.humidity as f64 / RAW_SCALE * 100.0
    }

    /// Temperature in degrees Celsius
    pub fn temperature_celsius(&self) -> f64 {
        self.temperature as f64 / RAW_SCALE * 200.0 - 50.0
    }
}

/// AHT20 driver
///
/// Remembers the query of the last trigger so the following read can
/// report only what was asked for.
pub struct Aht20<I2C, D> {
    i2c: I2C,
    delay: D,
    config: Aht20Config,
    pending: Option<Query>,
}

impl<I2C: I2cBus, D: DelayNs> Aht20<I2C, D> {
    /// Create a new driver with datasheet timings
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_config(i2c, delay, Aht20Config::default())
    }

    /// Create a new driver with custom configuration
    pub fn with_config(i2c: I2C, delay: D, config: Aht20Config) -> Self {
        Self {
            i2c,
            delay,
            config,
            pending: None,
        }
    }

    pub fn config(&self) -> &Aht20Config {
        &self.config
    }

    /// Query of the last successful trigger, if not read yet
    pub fn pending(&self) -> Option<Query> {
        self.pending
    }

    /// Give back the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn read_status(&mut self) -> Result<u8, hygro_hal::BusError> {
        let mut buf = [0u8; 1];
        self.i2c.read(self.config.address, &mut buf)?;
        Ok(buf[0])
    }

    /// Power-up wait and calibration loop
    fn initialize(&mut self) -> Result<(), Error> {
        let address = self.config.address;

        self.delay.delay_ms(self.config.power_up_ms);
        self.i2c.write(address, &cmd::STATUS).map_err(|e| {
            warn!("aht20: status query failed: {:?}", e);
            Error::Internal
        })?;

        let mut retries = 0;
        loop {
            self.delay.delay_ms(self.config.init_retry_ms);
            let byte = self.read_status().map_err(|e| {
                warn!("aht20: status read failed: {:?}", e);
                Error::Internal
            })?;

            if byte & status::CALIBRATED != 0 {
                debug!("aht20: calibrated after {} retries", retries);
                return Ok(());
            }

            if retries >= self.config.max_retries {
                return Err(SensorError::Init.into());
            }

            self.i2c
                .write(address, &cmd::INIT)
                .map_err(|_| SensorError::Init)?;
            retries += 1;
        }
    }

    /// Wait for the conversion and fetch the frame
    fn fetch_frame(&mut self) -> Result<[u8; FRAME_LEN], SensorError> {
        self.delay.delay_ms(self.config.settle_ms);

        let mut byte = self.read_status().map_err(|_| SensorError::Read)?;
        let mut polls = 0;
        while byte & status::BUSY != 0 {
            if polls >= self.config.max_retries {
                warn!("aht20: still busy after {} polls", polls);
                return Err(SensorError::Read);
            }
            self.delay.delay_ms(self.config.poll_ms);
            byte = self.read_status().map_err(|_| SensorError::Read)?;
            polls += 1;
        }

        let mut frame = [0u8; FRAME_LEN];
        self.i2c
            .read(self.config.address, &mut frame)
            .map_err(|_| SensorError::Read)?;
        Ok(frame)
    }
}

impl<I2C: I2cBus, D: DelayNs> HumiditySensor for Aht20<I2C, D> {
    fn init(&mut self) -> Result<(), Error> {
        self.initialize()
    }

    fn trigger(&mut self, query: Query) -> Result<(), Error> {
        self.i2c
            .write(self.config.address, &cmd::TRIGGER)
            .map_err(|_| SensorError::Measuring)?;
        self.pending = Some(query);
        Ok(())
    }

    fn read(&mut self) -> Result<Measurement, Error> {
        let frame = self.fetch_frame()?;
        let raw = RawReading::from_frame(&frame);
        trace!("aht20: raw {:?}", raw);

        let query = self.pending.take().unwrap_or_default();
        Ok(Measurement::for_query(
            query,
            raw.temperature_celsius(),
            raw.humidity_percent(),
        ))
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.i2c
            .write(self.config.address, &cmd::RESET)
            .map_err(|_| SensorError::Reset)?;
        self.pending = None;
        self.initialize().map_err(|e| {
            warn!("aht20: re-init after reset failed: {:?}", e);
            Error::Sensor(SensorError::Reset)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hygro_core::measurement::{Operation, Temperature, TempUnit};
    use hygro_core::render;
    use hygro_hal::BusError;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Bus replaying scripted reads and recording every write
    #[derive(Default)]
    struct FakeBus {
        writes: Vec<Vec<u8>>,
        reads: VecDeque<Result<Vec<u8>, BusError>>,
        fail_writes: Vec<u8>,
        read_count: usize,
    }

    impl FakeBus {
        fn with_reads(reads: &[&[u8]]) -> Self {
            Self {
                reads: reads.iter().map(|r| Ok(r.to_vec())).collect(),
                ..Default::default()
            }
        }

        fn commands(&self, command: &[u8]) -> usize {
            self.writes.iter().filter(|w| w.as_slice() == command).count()
        }
    }

    impl I2cBus for FakeBus {
        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
            assert_eq!(address, AHT20_ADDRESS);
            if self.fail_writes.contains(&data[0]) {
                return Err(BusError::Tx);
            }
            self.writes.push(data.to_vec());
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
            assert_eq!(address, AHT20_ADDRESS);
            self.read_count += 1;
            let data = self.reads.pop_front().unwrap_or(Err(BusError::Rx))?;
            buf.copy_from_slice(&data[..buf.len()]);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeDelay {
        total_ns: u64,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    impl FakeDelay {
        fn total_ms(&self) -> u64 {
            self.total_ns / 1_000_000
        }
    }

    /// Frame with both raw values at half scale: 50 %RH and 50 °C
    const HALF_SCALE: [u8; FRAME_LEN] = [0x1C, 0x80, 0x00, 0x08, 0x00, 0x00, 0x00];

    fn sensor(bus: FakeBus) -> Aht20<FakeBus, FakeDelay> {
        Aht20::new(bus, FakeDelay::default())
    }

    /// Idle frame carrying the given raw values
    fn frame(humidity: u32, temperature: u32) -> [u8; FRAME_LEN] {
        [
            0x1C,
            (humidity >> 12) as u8,
            (humidity >> 4) as u8,
            ((humidity & 0x0F) << 4) as u8 | ((temperature >> 16) & 0x0F) as u8,
            (temperature >> 8) as u8,
            temperature as u8,
            0x00,
        ]
    }

    fn read_with(query: Query, frame: [u8; FRAME_LEN]) -> Measurement {
        let mut aht = sensor(FakeBus::with_reads(&[&[0x1C], &frame]));
        aht.trigger(query).unwrap();
        aht.read().unwrap()
    }

    #[test]
    fn test_raw_unpacking() {
        let raw = RawReading::from_frame(&[0x1C, 0x65, 0xB4, 0x25, 0xCD, 0x26, 0xC6]);
        assert_eq!(raw.humidity, 0x65B42);
        assert_eq!(raw.temperature, 0x5CD26);

        let raw = RawReading::from_frame(&HALF_SCALE);
        assert_eq!(raw.humidity, 1 << 19);
        assert_eq!(raw.temperature, 1 << 19);
        assert_eq!(raw.humidity_percent(), 50.0);
        assert_eq!(raw.temperature_celsius(), 50.0);
    }

    #[test]
    fn test_raw_extremes() {
        let zero = RawReading::from_frame(&[0; FRAME_LEN]);
        assert_eq!(zero.humidity_percent(), 0.0);
        assert_eq!(zero.temperature_celsius(), -50.0);
    }

    #[test]
    fn test_init_already_calibrated() {
        let mut aht = sensor(FakeBus::with_reads(&[&[0x18]]));
        aht.init().unwrap();

        let (bus, delay) = aht.release();
        assert_eq!(bus.writes, [cmd::STATUS.to_vec()]);
        assert_eq!(bus.commands(&cmd::INIT), 0);
        assert_eq!(delay.total_ms(), 50);
    }

    #[test]
    fn test_init_calibrates_after_init_command() {
        let mut aht = sensor(FakeBus::with_reads(&[&[0x00], &[0x00], &[0x08]]));
        aht.init().unwrap();

        let (bus, _) = aht.release();
        assert_eq!(bus.commands(&cmd::INIT), 2);
    }

    #[test]
    fn test_init_gives_up_after_retries() {
        let reads: Vec<&[u8]> = vec![&[0x00u8][..]; 20];
        let mut aht = sensor(FakeBus::with_reads(&reads));
        assert_eq!(aht.init(), Err(Error::Sensor(SensorError::Init)));

        let (bus, _) = aht.release();
        assert_eq!(bus.read_count, 11);
        assert_eq!(bus.commands(&cmd::INIT), 10);
    }

    #[test]
    fn test_init_transfer_failures() {
        let mut bus = FakeBus::with_reads(&[&[0x00]]);
        bus.fail_writes.push(cmd::INIT[0]);
        assert_eq!(
            sensor(bus).init(),
            Err(Error::Sensor(SensorError::Init))
        );

        let mut bus = FakeBus::default();
        bus.fail_writes.push(cmd::STATUS[0]);
        assert_eq!(sensor(bus).init(), Err(Error::Internal));

        // Status read fails
        assert_eq!(sensor(FakeBus::default()).init(), Err(Error::Internal));
    }

    #[test]
    fn test_trigger_stores_query() {
        let mut aht = sensor(FakeBus::default());
        let query = Query::parse("TEMP&HUM", "K").unwrap();
        aht.trigger(query).unwrap();
        assert_eq!(aht.pending(), Some(query));

        let (bus, _) = aht.release();
        assert_eq!(bus.writes, [cmd::TRIGGER.to_vec()]);
    }

    #[test]
    fn test_trigger_failure() {
        let mut bus = FakeBus::default();
        bus.fail_writes.push(cmd::TRIGGER[0]);
        let mut aht = sensor(bus);
        assert_eq!(
            aht.trigger(Query::default()),
            Err(Error::Sensor(SensorError::Measuring))
        );
        assert_eq!(aht.pending(), None);
    }

    #[test]
    fn test_read_temperature() {
        let mut aht = sensor(FakeBus::with_reads(&[&[0x1C], &HALF_SCALE]));
        aht.trigger(Query::parse("TEMP", "").unwrap()).unwrap();

        let m = aht.read().unwrap();
        assert_eq!(
            m.temperature,
            Some(Temperature {
                value: 50.0,
                unit: TempUnit::Celsius
            })
        );
        assert_eq!(m.humidity, None);
        assert_eq!(aht.pending(), None);
    }

    #[test]
    fn test_freezing_point_in_fahrenheit() {
        let raw = frame(0, 1 << 18);
        assert_eq!(RawReading::from_frame(&raw).temperature_celsius(), 0.0);

        let m = read_with(
            Query {
                operation: Operation::Temperature,
                unit: TempUnit::Fahrenheit,
            },
            raw,
        );
        assert_eq!(
            m.temperature,
            Some(Temperature {
                value: 32.0,
                unit: TempUnit::Fahrenheit
            })
        );
    }

    #[test]
    fn test_boiling_point_in_kelvin() {
        let raw = frame(0, 3 << 18);
        assert_eq!(RawReading::from_frame(&raw).temperature_celsius(), 100.0);

        let m = read_with(
            Query {
                operation: Operation::Temperature,
                unit: TempUnit::Kelvin,
            },
            raw,
        );
        assert_eq!(
            m.temperature,
            Some(Temperature {
                value: 373.15,
                unit: TempUnit::Kelvin
            })
        );
    }

    #[test]
    fn test_rendered_values_keep_full_precision() {
        let query = Query {
            operation: Operation::Both,
            unit: TempUnit::Kelvin,
        };
        let m = read_with(query, frame(713_189, 1337));

        let temp = render::temperature_line(&m).unwrap();
        assert_eq!(temp.as_slice(), b"TEMP: 223.41\xDFK");
        let hum = render::humidity_line(&m).unwrap();
        assert_eq!(hum.as_slice(), b"HUM: 68.02%");
    }

    #[test]
    fn test_read_humidity_only() {
        let mut aht = sensor(FakeBus::with_reads(&[&[0x1C], &HALF_SCALE]));
        aht.trigger(Query::parse("HUM", "K").unwrap()).unwrap();

        let m = aht.read().unwrap();
        assert_eq!(m.temperature, None);
        assert_eq!(m.humidity, Some(50.0));
    }

    #[test]
    fn test_read_waits_out_busy() {
        let mut aht = sensor(FakeBus::with_reads(&[
            &[0x9C],
            &[0x9C],
            &[0x1C],
            &HALF_SCALE,
        ]));
        aht.trigger(Query {
            operation: Operation::Both,
            unit: TempUnit::Fahrenheit,
        })
        .unwrap();

        let m = aht.read().unwrap();
        assert_eq!(m.temperature.map(|t| t.value), Some(122.0));

        let (_, delay) = aht.release();
        assert_eq!(delay.total_ms(), 82);
    }

    #[test]
    fn test_read_busy_stuck() {
        let reads: Vec<&[u8]> = vec![&[0x80u8][..]; 20];
        let mut aht = sensor(FakeBus::with_reads(&reads));
        aht.trigger(Query::default()).unwrap();
        assert_eq!(aht.read(), Err(Error::Sensor(SensorError::Read)));

        let (bus, _) = aht.release();
        assert_eq!(bus.read_count, 11);
    }

    #[test]
    fn test_read_transfer_failure() {
        let mut aht = sensor(FakeBus::with_reads(&[&[0x1C]]));
        assert_eq!(aht.read(), Err(Error::Sensor(SensorError::Read)));
    }

    #[test]
    fn test_read_without_trigger_defaults_to_celsius() {
        let mut aht = sensor(FakeBus::with_reads(&[&[0x1C], &HALF_SCALE]));
        let m = aht.read().unwrap();
        assert_eq!(
            m.temperature,
            Some(Temperature {
                value: 50.0,
                unit: TempUnit::Celsius
            })
        );
        assert_eq!(m.humidity, None);
    }

    #[test]
    fn test_reset_reinitializes() {
        let mut aht = sensor(FakeBus::with_reads(&[&[0x08]]));
        aht.reset().unwrap();

        let (bus, _) = aht.release();
        assert_eq!(bus.writes, [cmd::RESET.to_vec(), cmd::STATUS.to_vec()]);
    }

    #[test]
    fn test_reset_failures() {
        let mut bus = FakeBus::default();
        bus.fail_writes.push(cmd::RESET[0]);
        assert_eq!(
            sensor(bus).reset(),
            Err(Error::Sensor(SensorError::Reset))
        );

        // Re-init never sees calibration
        let reads: Vec<&[u8]> = vec![&[0x00u8][..]; 20];
        assert_eq!(
            sensor(FakeBus::with_reads(&reads)).reset(),
            Err(Error::Sensor(SensorError::Reset))
        );
    }

    proptest! {
        #[test]
        fn prop_values_within_sensor_range(frame in any::<[u8; FRAME_LEN]>()) {
            let raw = RawReading::from_frame(&frame);
            prop_assert!(raw.humidity < 1 << 20);
            prop_assert!(raw.temperature < 1 << 20);

            let rh = raw.humidity_percent();
            let t = raw.temperature_celsius();
            prop_assert!((0.0..100.0).contains(&rh));
            prop_assert!((-50.0..150.0).contains(&t));
        }
    }
}
