//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field carries a serde default, so a file only needs the values that
//! differ from the stock DualSense-on-`can0` setup.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{BridgeError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub ramp: RampConfig,
    #[serde(default)]
    pub motors: MotorConfig,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input report layout
///
/// Indices address `InputReport::buttons` and `InputReport::axes`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InputConfig {
    #[serde(default = "default_square_button")]
    pub square_button: usize,

    #[serde(default = "default_cross_button")]
    pub cross_button: usize,

    #[serde(default = "default_circle_button")]
    pub circle_button: usize,

    #[serde(default = "default_triangle_button")]
    pub triangle_button: usize,

    /// Direction inversion modifier (L1)
    #[serde(default = "default_invert_button")]
    pub invert_button: usize,

    /// Button value that counts as pressed
    #[serde(default = "default_pressed_value")]
    pub pressed_value: i32,

    /// Deadman trigger axis (L2)
    #[serde(default = "default_deadman_axis")]
    pub deadman_axis: usize,

    /// Deadman is active while the trigger axis reads below this value
    #[serde(default = "default_deadman_threshold")]
    pub deadman_threshold: f32,

    #[serde(default = "default_dpad_vertical_axis")]
    pub dpad_vertical_axis: usize,

    /// Positive d-pad axis values mean "up". Controller dependent.
    #[serde(default = "default_dpad_up_positive")]
    pub dpad_up_positive: bool,

    /// Auxiliary axis (R2), read and logged only
    #[serde(default = "default_aux_axis")]
    pub aux_axis: usize,
}

/// Speed ramp configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RampConfig {
    #[serde(default = "default_initial_speed")]
    pub initial_speed: f32,

    #[serde(default = "default_min_speed")]
    pub min_speed: f32,

    #[serde(default = "default_max_speed")]
    pub max_speed: f32,

    #[serde(default = "default_speed_step")]
    pub step: f32,

    #[serde(default = "default_dpad_threshold")]
    pub dpad_threshold: f32,
}

/// Motor IDs bound to each face button
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MotorConfig {
    #[serde(default = "default_cross_motor")]
    pub cross: u32,

    #[serde(default = "default_circle_motor")]
    pub circle: u32,

    #[serde(default = "default_square_motor")]
    pub square: u32,

    #[serde(default = "default_triangle_motor")]
    pub triangle: u32,
}

/// Control bus configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BusConfig {
    #[serde(default = "default_bus_interface")]
    pub interface: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily rolling log file. Empty disables file output.
    #[serde(default)]
    pub directory: String,
}

// Default value functions
fn default_square_button() -> usize { 0 }
fn default_cross_button() -> usize { 1 }
fn default_circle_button() -> usize { 2 }
fn default_triangle_button() -> usize { 3 }
fn default_invert_button() -> usize { 4 }
fn default_pressed_value() -> i32 { 1 }
fn default_deadman_axis() -> usize { 3 }
fn default_deadman_threshold() -> f32 { 0.0 }
fn default_dpad_vertical_axis() -> usize { 7 }
fn default_dpad_up_positive() -> bool { true }
fn default_aux_axis() -> usize { 4 }

fn default_initial_speed() -> f32 { 100.0 }
fn default_min_speed() -> f32 { 0.0 }
fn default_max_speed() -> f32 { 300.0 }
fn default_speed_step() -> f32 { 10.0 }
fn default_dpad_threshold() -> f32 { 0.5 }

fn default_cross_motor() -> u32 { 12 }
fn default_circle_motor() -> u32 { 2 }
fn default_square_motor() -> u32 { 3 }
fn default_triangle_motor() -> u32 { 4 }

fn default_bus_interface() -> String { "can0".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            square_button: default_square_button(),
            cross_button: default_cross_button(),
            circle_button: default_circle_button(),
            triangle_button: default_triangle_button(),
            invert_button: default_invert_button(),
            pressed_value: default_pressed_value(),
            deadman_axis: default_deadman_axis(),
            deadman_threshold: default_deadman_threshold(),
            dpad_vertical_axis: default_dpad_vertical_axis(),
            dpad_up_positive: default_dpad_up_positive(),
            aux_axis: default_aux_axis(),
        }
    }
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            initial_speed: default_initial_speed(),
            min_speed: default_min_speed(),
            max_speed: default_max_speed(),
            step: default_speed_step(),
            dpad_threshold: default_dpad_threshold(),
        }
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            cross: default_cross_motor(),
            circle: default_circle_motor(),
            square: default_square_motor(),
            triangle: default_triangle_motor(),
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            interface: default_bus_interface(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
        }
    }
}

/// Builds a validation error in the same shape as a TOML parse error.
fn invalid(msg: impl std::fmt::Display) -> BridgeError {
    BridgeError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joy_motor_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file at `path` if it exists, otherwise fall back to defaults.
    ///
    /// Returns the configuration and whether it was read from disk.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        if path.as_ref().exists() {
            Ok((Self::load(path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Face buttons and the modifier must not share an index
        let buttons = [
            ("square_button", self.input.square_button),
            ("cross_button", self.input.cross_button),
            ("circle_button", self.input.circle_button),
            ("triangle_button", self.input.triangle_button),
            ("invert_button", self.input.invert_button),
        ];
        for (i, (name, index)) in buttons.iter().enumerate() {
            if let Some((other, _)) = buttons[i + 1..].iter().find(|(_, o)| o == index) {
                return Err(invalid(format!(
                    "{} and {} both use button index {}",
                    name, other, index
                )));
            }
        }

        if self.input.deadman_axis == self.input.dpad_vertical_axis {
            return Err(invalid("deadman_axis and dpad_vertical_axis must differ"));
        }

        if !self.input.deadman_threshold.is_finite()
            || self.input.deadman_threshold < -1.0
            || self.input.deadman_threshold > 1.0
        {
            return Err(invalid("deadman_threshold must be between -1.0 and 1.0"));
        }

        // Validate ramp
        let ramp = &self.ramp;
        for (name, value) in [
            ("initial_speed", ramp.initial_speed),
            ("min_speed", ramp.min_speed),
            ("max_speed", ramp.max_speed),
            ("step", ramp.step),
            ("dpad_threshold", ramp.dpad_threshold),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be a finite number", name)));
            }
        }

        if ramp.min_speed < 0.0 {
            return Err(invalid("min_speed cannot be negative"));
        }

        if ramp.min_speed >= ramp.max_speed {
            return Err(invalid("min_speed must be less than max_speed"));
        }

        if ramp.initial_speed < ramp.min_speed || ramp.initial_speed > ramp.max_speed {
            return Err(invalid(
                "initial_speed must be within speed range (min_speed to max_speed)",
            ));
        }

        if ramp.step <= 0.0 || ramp.step > ramp.max_speed - ramp.min_speed {
            return Err(invalid(
                "step must be greater than 0 and no larger than the speed range",
            ));
        }

        if ramp.dpad_threshold <= 0.0 || ramp.dpad_threshold > 1.0 {
            return Err(invalid("dpad_threshold must be greater than 0.0 and at most 1.0"));
        }

        // Validate motor IDs
        let ids = [
            self.motors.cross,
            self.motors.circle,
            self.motors.square,
            self.motors.triangle,
        ];
        for (i, id) in ids.iter().enumerate() {
            if ids[i + 1..].contains(id) {
                return Err(invalid(format!("motor id {} is bound more than once", id)));
            }
        }

        if self.bus.interface.is_empty() {
            return Err(invalid("bus interface cannot be empty"));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(format!(
                "log level '{}' must be one of: trace, debug, info, warn, error",
                self.logging.level
            )));
        }

        Ok(())
    }
}
