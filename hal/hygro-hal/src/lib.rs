//! Hygrostation Hardware Abstraction Layer
//!
//! This crate defines the byte-level contracts the rest of the firmware is
//! written against, so the interpreter and the device drivers can run on
//! any chip (and against fakes on the host).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  hygro-core (interpreter)               │
//! │  hygro-drivers (AHT20, HD44780)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hygro-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  embedded-io / embedded-hal impls       │
//! │  (embassy-stm32 in the firmware)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial byte transport
//! - [`i2c::I2cBus`] - 7-bit addressed I2C transfers

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod i2c;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use i2c::{BusError, HalI2c, I2cBus, I2cConfig, SharedI2c};
pub use uart::{IoUart, TransportConfig, TransportError, Uart, UartConfig, UartRx, UartTx};
