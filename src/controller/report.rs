//! # Input Report
//!
//! A point-in-time snapshot of the gamepad, laid out like a joystick message:
//! index-addressed button and axis arrays with no guarantee that any given
//! index is present.
//!
//! ## Default Layout (DualSense)
//!
//! | Index | Buttons | Axes |
//! |-------|---------|------|
//! | 0 | Square | |
//! | 1 | Cross | |
//! | 2 | Circle | |
//! | 3 | Triangle | L2 trigger (deadman) |
//! | 4 | L1 (invert) | R2 trigger (auxiliary) |
//! | 7 | | D-Pad vertical |
//!
//! The layout itself lives in [`InputConfig`](crate::config::InputConfig).

use serde::Deserialize;

/// One gamepad report.
///
/// # Examples
///
/// ```
/// use joy_motor_bridge::controller::report::InputReport;
///
/// let report = InputReport::new(vec![0.0; 8], vec![0, 1]);
/// assert!(report.button_is(1, 1));
/// assert!(!report.button_is(5, 1)); // out of range reads as released
/// assert_eq!(report.axis(9), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InputReport {
    /// Axis values, nominally -1.0 to 1.0.
    #[serde(default)]
    pub axes: Vec<f32>,
    /// Button values, 1 = pressed, 0 = released.
    #[serde(default)]
    pub buttons: Vec<i32>,
}

impl InputReport {
    /// Creates a report from raw axis and button arrays.
    #[must_use]
    pub fn new(axes: Vec<f32>, buttons: Vec<i32>) -> Self {
        Self { axes, buttons }
    }

    /// Returns the axis value at `index`, or `None` if the report is too short.
    #[must_use]
    pub fn axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied()
    }

    /// Returns true iff the button at `index` exists and equals `pressed_value`.
    #[must_use]
    pub fn button_is(&self, index: usize, pressed_value: i32) -> bool {
        self.buttons.get(index) == Some(&pressed_value)
    }
}
