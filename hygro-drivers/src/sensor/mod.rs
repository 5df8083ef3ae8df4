//! Humidity/temperature sensor implementations

pub mod aht20;

pub use aht20::{Aht20, Aht20Config, RawReading};
