//! Text sent back over the serial link

use crate::error::{CommandError, Error};

/// Shown once per idle period
pub const PROMPT: &[u8] = b"\r\n> ";

/// Usage block printed by `HELP`
pub const HELP_TEXT: &[u8] = b"\r\nCOMMANDS:\r\n\
\tHELP: prints the available commands\r\n\
\tGET <OPERATION> [UNIT]: performs a measurement using the AHT20 sensor. \
The property to be measured depends on the OPERATION field, which can have \
one of the following values:\r\n\
\t\t - TEMP\r\n\
\t\t - HUM\r\n\
\t\t - TEMP&HUM\r\n\
\t UNIT selects the temperature unit, Celsius (C) by default; other options \
are K (Kelvin) or F (Fahrenheit)\r\n\
\tRESET: resets the AHT20 sensor";

pub const LINE_TOO_LONG: &[u8] = b"\n\rERROR: line too long";
pub const BAD_ARGS: &[u8] = b"\n\rERROR: bad args";
pub const UNKNOWN_CMD: &[u8] = b"\n\rERROR: unknown cmd";
pub const UNKNOWN: &[u8] = b"\n\rERROR: unknown";

/// User-facing message for an error
///
/// Only the line-level errors get their own text; sensor, display and
/// transport failures all share the generic one.
pub fn error_message(error: Error) -> &'static [u8] {
    match error {
        Error::Command(CommandError::Overflow) => LINE_TOO_LONG,
        Error::Command(CommandError::TooManyArgs) => BAD_ARGS,
        Error::Command(CommandError::UnknownCommand) => UNKNOWN_CMD,
        _ => UNKNOWN,
    }
}
