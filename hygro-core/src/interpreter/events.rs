//! Interpreter events
//!
//! Each tick's handler reports what happened as one of these; the state
//! machine turns it into the next state.

use crate::error::Error;

/// Outcomes of a state handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// First character of a line stored
    ByteReceived,
    /// Line terminator received
    LineComplete,
    /// Line tokenized and its command recognized
    CommandParsed,
    /// Usage text sent
    HelpPrinted,
    /// `GET` dispatched
    MeasureRequested,
    /// `RESET` dispatched
    ResetRequested,
    /// Sensor accepted the trigger command
    MeasurementTriggered,
    /// Sensor reading decoded
    MeasurementRead,
    /// Reading rendered on the display
    MeasurementShown,
    /// Sensor reset and re-initialized
    SensorReset,
    /// Error message sent to the user
    ErrorReported,
    /// Handler failed
    Failed(Error),
}
