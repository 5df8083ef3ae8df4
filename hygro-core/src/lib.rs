//! Board-agnostic core logic for the Hygrostation firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Error taxonomy shared by every layer
//! - Measurement model (query, units, result)
//! - Hardware abstraction traits (humidity sensor, character display)
//! - Result rendering for the character display
//! - Command interpreter state machine

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod error;
pub mod interpreter;
pub mod measurement;
pub mod render;
pub mod traits;

pub use error::{CommandError, DisplayError, Error, SensorError};
pub use interpreter::{Session, State};
pub use measurement::{Measurement, Operation, Query, Temperature, TempUnit};
