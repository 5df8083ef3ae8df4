//! Interpreter session
//!
//! Owns everything the interpreter remembers between ticks: the state, the
//! line being assembled, its tokens and the last measurement. The
//! collaborators (transport, sensor, display) are lent to every
//! [`Session::tick`] call.

use heapless::Vec;

use hygro_hal::{UartRx, UartTx};

use super::events::Event;
use super::machine::State;
use super::messages::{error_message, HELP_TEXT, PROMPT};
use super::parser::{is_terminator, tokenize, Command, Tokens, MAX_CMD_LENGTH};
use crate::error::{CommandError, Error};
use crate::measurement::{Measurement, Query};
use crate::render::DisplayExt;
use crate::traits::{CharacterDisplay, HumiditySensor};

/// Command interpreter
#[derive(Debug, Clone)]
pub struct Session {
    state: State,
    line: Vec<u8, MAX_CMD_LENGTH>,
    tokens: Tokens,
    command: Option<Command>,
    measurement: Option<Measurement>,
    prompt_shown: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            line: Vec::new(),
            tokens: Tokens::new(),
            command: None,
            measurement: None,
            prompt_shown: false,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Characters of the line received so far
    pub fn line(&self) -> &[u8] {
        &self.line
    }

    pub fn tokens(&self) -> &Tokens {
        &self.tokens
    }

    pub fn command(&self) -> Option<Command> {
        self.command
    }

    /// Last decoded measurement, until the next reset
    pub fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }

    /// Forget the current line and result, and show the prompt again
    pub fn reset(&mut self) {
        self.line.clear();
        self.tokens.clear();
        self.command = None;
        self.measurement = None;
        self.prompt_shown = false;
    }

    /// Run one step of the interpreter
    ///
    /// Performs the work of the current state (at most one byte read, one
    /// sensor or display operation, or one message) and moves to the next
    /// state. Returns the state after the step.
    pub fn tick<T, S, D>(&mut self, transport: &mut T, sensor: &mut S, display: &mut D) -> State
    where
        T: UartTx + UartRx,
        S: HumiditySensor,
        D: CharacterDisplay,
    {
        let outcome = match self.state {
            State::Idle => self.on_idle(transport),
            State::Receiving => self.on_receiving(transport),
            State::Parsing => self.on_parsing(),
            State::Dispatching => self.on_dispatching(transport),
            State::Measuring => self.on_measuring(sensor),
            State::Reading => self.on_reading(sensor),
            State::Showing => self.on_showing(display),
            State::Resetting => self.on_resetting(sensor),
            State::Error(kind) => Ok(Some(self.on_error(transport, kind))),
        };

        match outcome {
            Ok(Some(event)) => self.apply(event),
            Ok(None) => {}
            Err(e) => self.apply(Event::Failed(e)),
        }

        self.state
    }

    fn apply(&mut self, event: Event) {
        let next = self.state.transition(event);
        if next != self.state {
            trace!("interpreter: {:?} -> {:?}", self.state, next);
            if next == State::Idle {
                self.reset();
            }
        }
        self.state = next;
    }

    fn echo<T: UartTx>(transport: &mut T, byte: u8) {
        if let Err(e) = transport.write_blocking(&[byte]) {
            warn!("echo failed: {:?}", e);
        }
    }

    fn on_idle<T: UartTx + UartRx>(&mut self, transport: &mut T) -> Result<Option<Event>, Error> {
        if !self.prompt_shown {
            if let Err(e) = transport.write_blocking(PROMPT) {
                warn!("prompt failed: {:?}", e);
            }
            self.prompt_shown = true;
        }

        let Some(byte) = transport.read_byte()? else {
            return Ok(None);
        };
        Self::echo(transport, byte);

        if is_terminator(byte) {
            return Ok(None);
        }

        self.line
            .push(byte)
            .map_err(|_| CommandError::Overflow)?;
        Ok(Some(Event::ByteReceived))
    }

    fn on_receiving<T: UartTx + UartRx>(
        &mut self,
        transport: &mut T,
    ) -> Result<Option<Event>, Error> {
        let Some(byte) = transport.read_byte()? else {
            return Ok(None);
        };
        Self::echo(transport, byte);

        // Terminator needs a free slot too
        if self.line.len() >= MAX_CMD_LENGTH {
            return Err(CommandError::Overflow.into());
        }

        if is_terminator(byte) {
            return Ok(Some(Event::LineComplete));
        }

        self.line
            .push(byte)
            .map_err(|_| CommandError::Overflow)?;
        Ok(None)
    }

    fn on_parsing(&mut self) -> Result<Option<Event>, Error> {
        self.tokens = tokenize(&self.line)?;
        let command =
            Command::from_token(self.tokens.command()).ok_or(CommandError::UnknownCommand)?;
        debug!("command {:?}", command);
        self.command = Some(command);
        Ok(Some(Event::CommandParsed))
    }

    fn on_dispatching<T: UartTx>(&mut self, transport: &mut T) -> Result<Option<Event>, Error> {
        match self.command {
            Some(Command::Help) => {
                transport.write_blocking(HELP_TEXT)?;
                Ok(Some(Event::HelpPrinted))
            }
            Some(Command::Get) => Ok(Some(Event::MeasureRequested)),
            Some(Command::Reset) => Ok(Some(Event::ResetRequested)),
            None => Err(CommandError::Unknown.into()),
        }
    }

    fn on_measuring<S: HumiditySensor>(&mut self, sensor: &mut S) -> Result<Option<Event>, Error> {
        if self.tokens.arg_count() > 2 {
            return Err(CommandError::TooManyArgs.into());
        }

        let query = Query::parse(self.tokens.arg(0), self.tokens.arg(1))?;
        sensor.trigger(query)?;
        Ok(Some(Event::MeasurementTriggered))
    }

    fn on_reading<S: HumiditySensor>(&mut self, sensor: &mut S) -> Result<Option<Event>, Error> {
        self.measurement = None;
        self.measurement = Some(sensor.read()?);
        Ok(Some(Event::MeasurementRead))
    }

    fn on_showing<D: CharacterDisplay>(&mut self, display: &mut D) -> Result<Option<Event>, Error> {
        let measurement = self.measurement.ok_or(Error::Internal)?;
        display.show_measurement(&measurement)?;
        Ok(Some(Event::MeasurementShown))
    }

    fn on_resetting<S: HumiditySensor>(&mut self, sensor: &mut S) -> Result<Option<Event>, Error> {
        sensor.reset()?;
        info!("sensor reset");
        Ok(Some(Event::SensorReset))
    }

    fn on_error<T: UartTx>(&mut self, transport: &mut T, kind: Error) -> Event {
        error!("command failed: {:?}", kind);
        if let Err(e) = transport.write_blocking(error_message(kind)) {
            warn!("error report failed: {:?}", e);
        }
        Event::ErrorReported
    }
}
