//! HD44780 character LCD behind a PCF8574 I2C backpack
//!
//! The backpack maps its 8 output pins onto the LCD in 4-bit mode:
//!
//! ```text
//! P7 P6 P5 P4 | P3        P2  P1  P0
//! D7 D6 D5 D4 | backlight EN  RW  RS
//! ```
//!
//! Every byte is sent as two nibbles, high first, each latched by raising
//! and dropping EN.

use embedded_hal::delay::DelayNs;
use hygro_core::error::DisplayError;
use hygro_core::traits::display::check_position;
use hygro_core::traits::CharacterDisplay;
use hygro_hal::{BusError, I2cBus};

/// Usual address of a PCF8574 backpack with all address pins high
pub const PCF8574_ADDRESS: u8 = 0x27;

/// Instruction set subset used by the driver
pub mod cmd {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const RETURN_HOME: u8 = 0x02;
    /// Increment address, no shift
    pub const ENTRY_MODE: u8 = 0x06;
    /// Display on, cursor off, blink off
    pub const DISPLAY_CONTROL: u8 = 0x0C;
    /// 4-bit bus, 2 lines, 5x8 font
    pub const FUNCTION_SET: u8 = 0x28;
    pub const SET_DDRAM_ADDRESS: u8 = 0x80;
}

const INIT_SEQUENCE: [u8; 5] = [
    cmd::FUNCTION_SET,
    cmd::DISPLAY_CONTROL,
    cmd::CLEAR_DISPLAY,
    cmd::ENTRY_MODE,
    cmd::RETURN_HOME,
];

const CLEAR_SEQUENCE: [u8; 2] = [cmd::CLEAR_DISPLAY, cmd::RETURN_HOME];

/// DDRAM address of the start of row 1
const ROW_OFFSET: u8 = 0x40;

/// DDRAM addresses are 7 bits wide
const DDRAM_LIMIT: u8 = 0x80;

/// Backpack control bits
const BACKLIGHT: u8 = 0x08;
const ENABLE: u8 = 0x04;

/// Text shown once the panel is up
pub const SPLASH: &[u8] = b"Medime esta";

/// Register selected by the RS line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Register {
    Instruction = 0,
    Data = 1,
}

/// DDRAM address of a cell, rejected past the 7-bit address space
fn ddram_address(row: u8, col: u8) -> Result<u8, DisplayError> {
    let start = row
        .checked_mul(ROW_OFFSET)
        .filter(|&a| a < DDRAM_LIMIT)
        .ok_or(DisplayError::InvalidRow)?;
    start
        .checked_add(col)
        .filter(|&a| a < DDRAM_LIMIT)
        .ok_or(DisplayError::InvalidCol)
}

/// Control nibble for a write cycle
fn control(register: Register, enable: bool) -> u8 {
    let enable = if enable { ENABLE } else { 0 };
    // RW stays low, the busy flag is never read
    BACKLIGHT | enable | register as u8
}

/// HD44780 configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hd44780Config {
    /// Backpack I2C address
    pub address: u8,
    /// Visible rows
    pub rows: u8,
    /// Visible columns
    pub cols: u8,
    /// Wait after power-up before the first nibble
    pub power_up_ms: u32,
}

impl Hd44780Config {
    /// Common 16x2 module on a PCF8574 backpack
    pub const LCD_1602: Self = Self {
        address: PCF8574_ADDRESS,
        rows: 2,
        cols: 16,
        power_up_ms: 100,
    };
}

impl Default for Hd44780Config {
    fn default() -> Self {
        Self::LCD_1602
    }
}

/// HD44780 driver
pub struct Hd44780<I2C, D> {
    i2c: I2C,
    delay: D,
    config: Hd44780Config,
    row: u8,
}

impl<I2C: I2cBus, D: DelayNs> Hd44780<I2C, D> {
    /// Create a new driver for a 16x2 panel
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_config(i2c, delay, Hd44780Config::default())
    }

    /// Create a new driver with custom configuration
    pub fn with_config(i2c: I2C, delay: D, config: Hd44780Config) -> Self {
        Self {
            i2c,
            delay,
            config,
            row: 0,
        }
    }

    pub fn config(&self) -> &Hd44780Config {
        &self.config
    }

    /// Row the cursor is on
    pub fn row(&self) -> u8 {
        self.row
    }

    /// Give back the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Switch the panel to 4-bit mode, configure it and show the splash
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(self.config.power_up_ms);

        // 8-bit function set twice, then switch to 4-bit
        for (nibble, wait_ms) in [(0x30, 5), (0x30, 1), (0x20, 1)] {
            self.write_nibble(nibble, Register::Instruction)
                .map_err(|e| {
                    warn!("hd44780: wake-up nibble failed: {:?}", e);
                    DisplayError::Init
                })?;
            self.delay.delay_ms(wait_ms);
        }

        self.send_commands(&INIT_SEQUENCE)
            .map_err(|_| DisplayError::Init)?;
        self.row = 0;

        self.send_data(SPLASH).map_err(|_| DisplayError::Init)?;
        info!("hd44780: ready");
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8, register: Register) -> Result<(), BusError> {
        let address = self.config.address;
        let nibble = nibble & 0xF0;
        self.i2c.write(address, &[nibble | control(register, true)])?;
        self.i2c.write(address, &[nibble | control(register, false)])
    }

    fn write_byte(&mut self, byte: u8, register: Register) -> Result<(), BusError> {
        self.write_nibble(byte & 0xF0, register)?;
        self.write_nibble(byte << 4, register)
    }

    fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.write_byte(command, Register::Instruction)
            .map_err(|_| DisplayError::SendCommand)?;

        // Clear and home take 1.52 ms, everything else 37 us
        let wait_ms = match command {
            cmd::CLEAR_DISPLAY | cmd::RETURN_HOME => 2,
            _ => 1,
        };
        self.delay.delay_ms(wait_ms);
        Ok(())
    }

    fn send_commands(&mut self, commands: &[u8]) -> Result<(), DisplayError> {
        commands.iter().try_for_each(|&c| self.send_command(c))
    }

    fn send_data(&mut self, text: &[u8]) -> Result<(), DisplayError> {
        text.iter().try_for_each(|&b| {
            self.write_byte(b, Register::Data)
                .map_err(|_| DisplayError::SendData)
        })
    }
}

impl<I2C: I2cBus, D: DelayNs> CharacterDisplay for Hd44780<I2C, D> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.send_commands(&CLEAR_SEQUENCE)?;
        self.row = 0;
        Ok(())
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        check_position(row, col, self.config.rows, self.config.cols)?;
        let address = ddram_address(row, col)?;
        self.send_command(cmd::SET_DDRAM_ADDRESS | address)?;
        self.row = row;
        Ok(())
    }

    fn print(&mut self, text: &[u8]) -> Result<(), DisplayError> {
        self.send_data(text)
    }

    fn println(&mut self, text: &[u8]) -> Result<(), DisplayError> {
        self.print(text)?;
        let next = (self.row + 1)
            .checked_rem(self.config.rows)
            .ok_or(DisplayError::InvalidRow)?;
        self.set_cursor(next, 0)
    }
}
