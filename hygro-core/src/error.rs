//! Error taxonomy
//!
//! Every layer reports failures as a small `Copy` enum; [`Error`] nests them
//! so a single value can travel from a driver up to the interpreter, which
//! is the only place errors are handled.

pub use hygro_hal::{BusError, TransportError};

/// Humidity/temperature sensor failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Calibration bit never came up during initialization
    Init,
    /// Temperature unit not one of C, K, F
    InvalidUnit,
    /// Operation not one of TEMP, HUM, TEMP&HUM
    InvalidOperation,
    /// Measurement could not be triggered
    Measuring,
    /// Soft reset or the re-initialization after it failed
    Reset,
    /// Busy flag never cleared, or the data frame could not be read
    Read,
}

/// Character display failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Power-up sequence failed
    Init,
    /// An instruction byte could not be sent
    SendCommand,
    /// A character byte could not be sent
    SendData,
    /// Cursor row outside the panel
    InvalidRow,
    /// Cursor column outside the panel
    InvalidCol,
}

/// Command interpreter failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Line does not fit in the input buffer
    Overflow,
    /// Line contains a character outside `[A-Za-z0-9 _&]`
    InvalidChar,
    /// More than a command and two arguments
    TooManyArgs,
    /// First token is not a known command
    UnknownCommand,
    /// Dispatch reached with no recognized command
    Unknown,
}

/// Application-wide error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Serial transport failure
    Transport(TransportError),
    /// I2C bus failure
    Bus(BusError),
    /// Sensor protocol failure
    Sensor(SensorError),
    /// Display failure
    Display(DisplayError),
    /// Command line rejected by the interpreter
    Command(CommandError),
    /// Caller passed an argument the operation cannot accept
    InvalidArg,
    /// A lower layer failed in a way the caller cannot act on
    Internal,
    /// Unclassified failure
    Unknown,
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::InvalidSize => Error::InvalidArg,
            other => Error::Transport(other),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Error::Bus(e)
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Error::Sensor(e)
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Error::Display(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}
