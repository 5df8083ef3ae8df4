//! Measurement rendering
//!
//! Lays a [`Measurement`] out on a character display:
//!
//! ```text
//! ┌────────────────┐
//! │TEMP: 23.41°C   │
//! │HUM: 41.07%     │
//! └────────────────┘
//! ```

use core::fmt::Write;

use heapless::Vec;

use crate::error::Error;
use crate::measurement::Measurement;
use crate::traits::CharacterDisplay;

/// Capacity of one rendered message, terminator slot included
pub const MAX_MESSAGE_LENGTH: usize = 16;

/// Longest formatted text kept before the suffix bytes are appended
const MAX_TEXT_LENGTH: usize = MAX_MESSAGE_LENGTH - 1;

/// Degree sign in the HD44780 A00 character ROM
pub const DEGREE_SYMBOL: u8 = 0xDF;

/// Percent sign
pub const PERCENT_SYMBOL: u8 = b'%';

/// Formatted line: text plus up to two suffix bytes
type Line = Vec<u8, { MAX_MESSAGE_LENGTH + 1 }>;

/// `fmt::Write` sink that silently drops whatever does not fit
struct Truncating<'a> {
    buf: &'a mut Line,
    limit: usize,
}

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for &b in s.as_bytes() {
            if self.buf.len() >= self.limit {
                break;
            }
            // Cannot fail: limit is below capacity
            let _ = self.buf.push(b);
        }
        Ok(())
    }
}

fn format_line(args: core::fmt::Arguments<'_>, suffix: &[u8]) -> Line {
    let mut line = Line::new();
    let mut sink = Truncating {
        buf: &mut line,
        limit: MAX_TEXT_LENGTH,
    };
    let _ = sink.write_fmt(args);
    for &b in suffix {
        let _ = line.push(b);
    }
    line
}

/// Temperature line: `TEMP: <value>` + degree sign + unit code
pub fn temperature_line(measurement: &Measurement) -> Option<Line> {
    measurement.temperature.map(|t| {
        format_line(
            format_args!("TEMP: {:.2}", t.value),
            &[DEGREE_SYMBOL, t.unit.code()],
        )
    })
}

/// Humidity line: `HUM: <value>%`
pub fn humidity_line(measurement: &Measurement) -> Option<Line> {
    measurement
        .humidity
        .map(|h| format_line(format_args!("HUM: {:.2}", h), &[PERCENT_SYMBOL]))
}

/// Helper trait for showing measurements on a character display
pub trait DisplayExt: CharacterDisplay {
    /// Clear the screen and show the fields present in `measurement`
    ///
    /// The temperature line ends with a line break so humidity lands on
    /// the second row. Display failures are reported as
    /// [`Error::Internal`] and stop the rendering.
    fn show_measurement(&mut self, measurement: &Measurement) -> Result<(), Error> {
        self.clear().map_err(|e| {
            warn!("display clear failed: {:?}", e);
            Error::Internal
        })?;

        if let Some(line) = temperature_line(measurement) {
            self.println(&line).map_err(|e| {
                warn!("display println failed: {:?}", e);
                Error::Internal
            })?;
        }

        if let Some(line) = humidity_line(measurement) {
            self.print(&line).map_err(|e| {
                warn!("display print failed: {:?}", e);
                Error::Internal
            })?;
        }

        Ok(())
    }
}

// Blanket implementation for all CharacterDisplay types
impl<T: CharacterDisplay + ?Sized> DisplayExt for T {}
