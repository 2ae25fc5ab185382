//! # Motor Module
//!
//! The motor side of the bridge: the [`MotorSink`] seam that real drivers
//! implement, the static face-button to motor bindings, and per-frame dispatch.
//!
//! This module handles:
//! - Pairing each binding with its sink ([`MotorChannel`])
//! - Sending one frame of commands with an explicit result per motor
//! - Collecting the outcomes into a [`SendReport`] for logging
//!
//! A communication fault on one motor never stops the others from being sent.

mod simulated;

pub use simulated::SimulatedMotor;

use thiserror::Error;
use tracing::error;

use crate::config::MotorConfig;
use crate::controller::mapper::{FaceButton, MotorCommand};

/// Number of motors driven by the bridge (one per face button).
pub const MOTOR_COUNT: usize = 4;

/// Errors raised by a motor sink
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MotorError {
    /// Send attempted before the attach step
    #[error("motor {motor_id} is not connected")]
    NotConnected { motor_id: u32 },

    /// Bus-level fault while talking to the motor
    #[error("communication fault on motor {motor_id}: {reason}")]
    Communication { motor_id: u32, reason: String },

    /// A command addressed a motor that has no channel
    #[error("no channel bound for motor {motor_id}")]
    Unbound { motor_id: u32 },
}

/// An addressable actuator accepting signed velocity commands.
///
/// Implementations wrap a concrete motor driver. `connect` is called once at
/// startup before any `send_velocity`.
#[cfg_attr(test, mockall::automock)]
pub trait MotorSink: Send {
    /// Attach to the control bus.
    fn connect(&mut self, interface: &str) -> Result<(), MotorError>;

    /// Command a velocity. Errors are transient and reported per call.
    fn send_velocity(&mut self, velocity: f32) -> Result<(), MotorError>;
}

/// Association of a face button with a motor ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorBinding {
    pub control: FaceButton,
    pub motor_id: u32,
}

/// Bindings for all four face buttons, in [`FaceButton::ALL`] order.
pub type MotorBindings = [MotorBinding; MOTOR_COUNT];

impl MotorBinding {
    /// Builds the four bindings from configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use joy_motor_bridge::config::MotorConfig;
    /// use joy_motor_bridge::motor::MotorBinding;
    ///
    /// let bindings = MotorBinding::from_config(&MotorConfig::default());
    /// assert_eq!(bindings[0].motor_id, 12); // cross
    /// ```
    #[must_use]
    pub fn from_config(config: &MotorConfig) -> MotorBindings {
        FaceButton::ALL.map(|control| MotorBinding {
            control,
            motor_id: match control {
                FaceButton::Cross => config.cross,
                FaceButton::Circle => config.circle,
                FaceButton::Square => config.square,
                FaceButton::Triangle => config.triangle,
            },
        })
    }
}

/// A binding paired with the sink that drives it.
#[derive(Debug)]
pub struct MotorChannel<S> {
    pub binding: MotorBinding,
    pub sink: S,
}

impl<S> MotorChannel<S> {
    pub fn new(binding: MotorBinding, sink: S) -> Self {
        Self { binding, sink }
    }
}

/// Result of sending one command.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub motor_id: u32,
    pub velocity: f32,
    pub result: Result<(), MotorError>,
}

/// Outcomes of every send in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendReport {
    pub outcomes: Vec<SendOutcome>,
}

impl SendReport {
    /// True if every send succeeded.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Failed sends as `(motor_id, error)`.
    pub fn failures(&self) -> impl Iterator<Item = (u32, &MotorError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.motor_id, e)))
    }
}

/// Sends each command to the channel bound to its motor ID.
///
/// Every command is attempted. Failures are logged and recorded in the
/// returned report; they are never propagated.
pub fn dispatch<S: MotorSink>(
    channels: &mut [MotorChannel<S>],
    commands: &[MotorCommand],
) -> SendReport {
    let outcomes = commands
        .iter()
        .map(|command| {
            let result = match channels
                .iter_mut()
                .find(|c| c.binding.motor_id == command.motor_id)
            {
                Some(channel) => channel.sink.send_velocity(command.velocity),
                None => Err(MotorError::Unbound {
                    motor_id: command.motor_id,
                }),
            };

            if let Err(e) = &result {
                error!("Error sending velocity to motor {}: {}", command.motor_id, e);
            }

            SendOutcome {
                motor_id: command.motor_id,
                velocity: command.velocity,
                result,
            }
        })
        .collect();

    SendReport { outcomes }
}
