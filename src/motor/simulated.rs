//! In-process motor sink
//!
//! Stands in for a bus driver: accepts the attach step, records the last
//! commanded velocity and logs it. Used by the binary for dry runs and by tests.

use tracing::{debug, info};

use super::{MotorError, MotorSink};

#[derive(Debug, Clone)]
pub struct SimulatedMotor {
    motor_id: u32,
    interface: Option<String>,
    last_velocity: f32,
    sends: u64,
}

impl SimulatedMotor {
    pub fn new(motor_id: u32) -> Self {
        Self {
            motor_id,
            interface: None,
            last_velocity: 0.0,
            sends: 0,
        }
    }

    pub fn motor_id(&self) -> u32 {
        self.motor_id
    }

    /// Bus interface this motor was attached to, if any.
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    pub fn last_velocity(&self) -> f32 {
        self.last_velocity
    }

    /// Number of accepted velocity commands.
    pub fn sends(&self) -> u64 {
        self.sends
    }
}

impl MotorSink for SimulatedMotor {
    fn connect(&mut self, interface: &str) -> Result<(), MotorError> {
        info!("Simulated motor {} attached to {}", self.motor_id, interface);
        self.interface = Some(interface.to_string());
        Ok(())
    }

    fn send_velocity(&mut self, velocity: f32) -> Result<(), MotorError> {
        if self.interface.is_none() {
            return Err(MotorError::NotConnected {
                motor_id: self.motor_id,
            });
        }

        if velocity != self.last_velocity {
            debug!("Motor {} velocity {:.2} -> {:.2}", self.motor_id, self.last_velocity, velocity);
        }
        self.last_velocity = velocity;
        self.sends += 1;
        Ok(())
    }
}
