//! # Joy Motor Bridge Library
//!
//! Drive four bus-addressed motors from a gamepad.
//!
//! This library maps joystick-style input reports to per-motor velocity
//! commands behind a deadman switch, with an edge-triggered d-pad speed ramp
//! and L1 direction inversion.

pub mod bridge;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod motor;
