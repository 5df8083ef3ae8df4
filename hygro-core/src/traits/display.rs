//! Character display trait

use crate::error::DisplayError;

/// Trait for character displays (HD44780 style, 2 rows x 16 columns)
///
/// Text is passed as raw bytes so characters from the panel's ROM above
/// ASCII (the degree sign is `0xDF`) can be sent as-is.
pub trait CharacterDisplay {
    /// Number of visible rows
    const ROWS: u8 = 2;
    /// Number of visible columns
    const COLS: u8 = 16;

    /// Clear the screen and home the cursor
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the cursor
    ///
    /// - `row`: Row number (0-1)
    /// - `col`: Column number (0-15)
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError>;

    /// Write text at the cursor
    fn print(&mut self, text: &[u8]) -> Result<(), DisplayError>;

    /// Write text, then move to the start of the next row
    ///
    /// The last row wraps back to row 0.
    fn println(&mut self, text: &[u8]) -> Result<(), DisplayError>;
}

impl<T: CharacterDisplay + ?Sized> CharacterDisplay for &mut T {
    const ROWS: u8 = T::ROWS;
    const COLS: u8 = T::COLS;

    fn clear(&mut self) -> Result<(), DisplayError> {
        T::clear(self)
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        T::set_cursor(self, row, col)
    }

    fn print(&mut self, text: &[u8]) -> Result<(), DisplayError> {
        T::print(self, text)
    }

    fn println(&mut self, text: &[u8]) -> Result<(), DisplayError> {
        T::println(self, text)
    }
}

/// Check a cursor position against the panel geometry
pub fn check_position(row: u8, col: u8, rows: u8, cols: u8) -> Result<(), DisplayError> {
    if row >= rows {
        return Err(DisplayError::InvalidRow);
    }
    if col >= cols {
        return Err(DisplayError::InvalidCol);
    }
    Ok(())
}
