//! # Controller Module
//!
//! Gamepad input handling.
//!
//! This module handles:
//! - The joystick-style input report and its fixed index layout
//! - Reading a stream of reports
//! - Mapping reports to motor commands (deadman, speed ramp, routing)

pub mod mapper;
pub mod report;
pub mod source;
