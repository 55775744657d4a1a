//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the relay hold controller and the adaptive rate
//! controller into the per-frame loop.  All interaction with hardware and
//! the vision pipeline happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
