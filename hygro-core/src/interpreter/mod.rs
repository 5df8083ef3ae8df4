//! Serial command interpreter
//!
//! Reads a line from the transport byte by byte, parses it into a command
//! and runs it against the sensor and display:
//!
//! ```text
//!                ┌──────┐ byte  ┌───────────┐ CR/LF ┌─────────┐
//!         ┌────▶ │ Idle │ ────▶ │ Receiving │ ────▶ │ Parsing │
//!         │      └──────┘       └───────────┘       └─────────┘
//!         │                                              │
//!         │   HELP ┌─────────────┐ ◀─────────────────────┘
//!         ├─────── │ Dispatching │
//!         │        └─────────────┘
//!         │      RESET │     │ GET
//!         │            ▼     ▼
//!         │  ┌───────────┐ ┌───────────┐   ┌─────────┐   ┌─────────┐
//!         ├─ │ Resetting │ │ Measuring │ ─▶│ Reading │ ─▶│ Showing │
//!         │  └───────────┘ └───────────┘   └─────────┘   └─────────┘
//!         │                                                   │
//!         └───────────────────────────────────────────────────┘
//! ```
//!
//! Any handler failure moves to `Error`, which reports the failure and goes
//! back to `Idle`. Entering `Idle` always clears the session.

mod events;
mod machine;
mod messages;
mod parser;
mod session;

pub use events::Event;
pub use machine::State;
pub use messages::{error_message, HELP_TEXT, PROMPT};
pub use parser::{is_terminator, is_valid_char, tokenize, Command, Tokens, MAX_CMD_LENGTH};
pub use session::Session;
