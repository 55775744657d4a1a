//! Relay GPIO drivers and hardware initialisation.

pub mod gpio;
pub mod hw_init;
