//! Hardware abstraction traits
//!
//! These traits define the interface between the command interpreter and
//! the device drivers, so the interpreter can be exercised against fakes.

pub mod display;
pub mod sensor;

pub use display::CharacterDisplay;
pub use sensor::HumiditySensor;
