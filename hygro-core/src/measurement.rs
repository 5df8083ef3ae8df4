//! Measurement model
//!
//! A `GET` command becomes a [`Query`]; the sensor answers it with a
//! [`Measurement`] holding only the fields the query asked for.

use crate::error::SensorError;

/// What a measurement should report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Temperature only
    Temperature,
    /// Relative humidity only
    Humidity,
    /// Both values
    Both,
}

impl Operation {
    /// Match an operation token (case-sensitive)
    pub fn parse(token: &str) -> Result<Self, SensorError> {
        match token {
            "TEMP" => Ok(Operation::Temperature),
            "HUM" => Ok(Operation::Humidity),
            "TEMP&HUM" => Ok(Operation::Both),
            _ => Err(SensorError::InvalidOperation),
        }
    }

    /// Whether the temperature field is reported
    pub fn wants_temperature(&self) -> bool {
        matches!(self, Operation::Temperature | Operation::Both)
    }

    /// Whether the humidity field is reported
    pub fn wants_humidity(&self) -> bool {
        matches!(self, Operation::Humidity | Operation::Both)
    }
}

/// Temperature unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TempUnit {
    #[default]
    Celsius,
    Kelvin,
    Fahrenheit,
}

impl TempUnit {
    /// Match a unit token
    ///
    /// An empty token selects Celsius.
    pub fn parse(token: &str) -> Result<Self, SensorError> {
        match token {
            "" | "C" => Ok(TempUnit::Celsius),
            "K" => Ok(TempUnit::Kelvin),
            "F" => Ok(TempUnit::Fahrenheit),
            _ => Err(SensorError::InvalidUnit),
        }
    }

    /// Convert a Celsius reading into this unit
    pub fn from_celsius(&self, celsius: f64) -> f64 {
        match self {
            TempUnit::Celsius => celsius,
            TempUnit::Kelvin => celsius + 273.15,
            TempUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Single-character unit code shown after the degree sign
    pub fn code(&self) -> u8 {
        match self {
            TempUnit::Celsius => b'C',
            TempUnit::Kelvin => b'K',
            TempUnit::Fahrenheit => b'F',
        }
    }
}

/// Parsed `GET` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Query {
    pub operation: Operation,
    pub unit: TempUnit,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            operation: Operation::Temperature,
            unit: TempUnit::Celsius,
        }
    }
}

impl Query {
    /// Build a query from the operation and unit arguments
    ///
    /// The operation is checked first, so a line with both arguments wrong
    /// reports [`SensorError::InvalidOperation`].
    pub fn parse(operation: &str, unit: &str) -> Result<Self, SensorError> {
        let operation = Operation::parse(operation)?;
        let unit = TempUnit::parse(unit)?;
        Ok(Self { operation, unit })
    }
}

/// Temperature value tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    pub value: f64,
    pub unit: TempUnit,
}

/// Result of one read
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Present when the query asked for temperature
    pub temperature: Option<Temperature>,
    /// Relative humidity in percent, present when asked for
    pub humidity: Option<f64>,
}

impl Measurement {
    /// Keep the fields `query` asked for, converting the temperature
    pub fn for_query(query: Query, celsius: f64, humidity: f64) -> Self {
        let temperature = query.operation.wants_temperature().then(|| Temperature {
            value: query.unit.from_celsius(celsius),
            unit: query.unit,
        });
        let humidity = query.operation.wants_humidity().then_some(humidity);

        Self {
            temperature,
            humidity,
        }
    }
}
