//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in hygro-core, written against the bus contract of hygro-hal:
//!
//! - Humidity/temperature sensors (AHT20)
//! - Character displays (HD44780 behind a PCF8574 I2C backpack)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod display;
pub mod sensor;

pub use display::{Hd44780, Hd44780Config};
pub use sensor::{Aht20, Aht20Config};
