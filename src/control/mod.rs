//! The two control loops: relay hold timing and classification rate.
//!
//! Both are pure state machines over explicit timestamps.  They share no
//! state with each other and never touch hardware.

pub mod rate;
pub mod relay;
