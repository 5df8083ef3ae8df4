//! State machine definition
//!
//! Every interpreter action is a function of the current state; the
//! handler's [`Event`] decides the next one.

use super::events::Event;
use crate::error::Error;

/// Interpreter states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Waiting for the first character of a line
    Idle,
    /// Collecting characters until a line terminator
    Receiving,
    /// Tokenizing and validating the buffered line
    Parsing,
    /// Routing the recognized command
    Dispatching,
    /// Parsing the query and triggering the sensor
    Measuring,
    /// Waiting for and decoding the sensor reading
    Reading,
    /// Rendering the reading on the display
    Showing,
    /// Resetting the sensor
    Resetting,
    /// Reporting a failure to the user
    Error(Error),
}

impl State {
    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, State::Error(_))
    }

    /// Process an event and return the next state
    ///
    /// This is the core state transition logic.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Line assembly
            (Idle, ByteReceived) => Receiving,
            (Receiving, LineComplete) => Parsing,
            (Parsing, CommandParsed) => Dispatching,

            // Dispatch
            (Dispatching, HelpPrinted) => Idle,
            (Dispatching, MeasureRequested) => Measuring,
            (Dispatching, ResetRequested) => Resetting,

            // Measurement cycle
            (Measuring, MeasurementTriggered) => Reading,
            (Reading, MeasurementRead) => Showing,
            (Showing, MeasurementShown) => Idle,

            // Sensor reset
            (Resetting, SensorReset) => Idle,

            // Error transitions; a failure while reporting keeps the
            // first error
            (Error(_), ErrorReported) => Idle,
            (Error(_), Failed(_)) => self,
            (_, Failed(kind)) => Error(kind),

            // Default: stay in current state
            _ => self,
        }
    }
}
