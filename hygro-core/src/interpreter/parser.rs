//! Command line tokenizer
//!
//! Splits a received line into a command and up to two arguments,
//! upper-casing letters on the way.

use heapless::{String, Vec};

use crate::error::CommandError;

/// Capacity of the line buffer, terminator slot included
pub const MAX_CMD_LENGTH: usize = 25;

/// Command plus two arguments
pub const MAX_TOKENS: usize = 3;

/// One upper-cased token
pub type Token = String<MAX_CMD_LENGTH>;

/// Commands the interpreter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Print usage
    Help,
    /// Measure and show on the display
    Get,
    /// Soft-reset the sensor
    Reset,
}

impl Command {
    /// Match an upper-cased command token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "HELP" => Some(Command::Help),
            "GET" => Some(Command::Get),
            "RESET" => Some(Command::Reset),
            _ => None,
        }
    }
}

/// Tokens of one command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tokens {
    tokens: Vec<Token, MAX_TOKENS>,
}

impl Tokens {
    pub const fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// First token, empty if the line had none
    pub fn command(&self) -> &str {
        self.tokens.first().map(|t| t.as_str()).unwrap_or("")
    }

    /// Argument `idx` (0-based, after the command), empty if absent
    pub fn arg(&self, idx: usize) -> &str {
        self.tokens
            .get(idx + 1)
            .map(|t| t.as_str())
            .unwrap_or("")
    }

    /// Number of non-empty arguments
    pub fn arg_count(&self) -> usize {
        self.tokens.iter().skip(1).filter(|t| !t.is_empty()).count()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}

/// Characters allowed in a command line
pub fn is_valid_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b' ' | b'_' | b'&')
}

/// Line terminators
pub fn is_terminator(byte: u8) -> bool {
    matches!(byte, b'\n' | b'\r')
}

/// Split `line` on spaces into at most [`MAX_TOKENS`] upper-cased tokens
///
/// Consecutive spaces count as one separator and never produce empty
/// tokens. Characters are validated left to right, so whichever problem
/// comes first in the line is the one reported.
pub fn tokenize(line: &[u8]) -> Result<Tokens, CommandError> {
    let mut tokens = Tokens::new();
    let mut current: Option<Token> = None;

    for &byte in line {
        if byte == b' ' {
            if let Some(token) = current.take() {
                tokens
                    .tokens
                    .push(token)
                    .map_err(|_| CommandError::TooManyArgs)?;
            }
            continue;
        }

        if !is_valid_char(byte) {
            return Err(CommandError::InvalidChar);
        }

        if current.is_none() {
            if tokens.len() >= MAX_TOKENS {
                return Err(CommandError::TooManyArgs);
            }
            current = Some(Token::new());
        }

        if let Some(token) = current.as_mut() {
            token
                .push(byte.to_ascii_uppercase() as char)
                .map_err(|_| CommandError::Overflow)?;
        }
    }

    if let Some(token) = current {
        tokens
            .tokens
            .push(token)
            .map_err(|_| CommandError::TooManyArgs)?;
    }

    Ok(tokens)
}
