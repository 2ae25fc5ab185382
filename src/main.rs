//! # Joy Motor Bridge
//!
//! Drive four bus-addressed motors from a gamepad.
//!
//! Reads joystick reports as JSON lines on stdin and sends velocity commands
//! to the motors bound to cross, circle, square and triangle.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (`JOY_MOTOR_BRIDGE_CONFIG`, default `config/default.toml`)
//!    - Set up logging with tracing subscriber
//!    - Attach every motor to the bus
//!
//! 2. **Main Loop**
//!    - Map each report (deadman, speed ramp, routing) and send the commands
//!    - Handle Ctrl+C or end of input for shutdown
//!
//! 3. **Shutdown**
//!    - Command zero velocity on every motor
//!
//! # Examples
//!
//! ```bash
//! cat recorded_reports.jsonl | cargo run --release
//! ```

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;

use joy_motor_bridge::bridge::{self, Bridge};
use joy_motor_bridge::config::Config;
use joy_motor_bridge::controller::mapper::CommandMapper;
use joy_motor_bridge::controller::source::ReportSource;
use joy_motor_bridge::logging;
use joy_motor_bridge::motor::SimulatedMotor;

/// Environment variable naming the configuration file
const CONFIG_ENV: &str = "JOY_MOTOR_BRIDGE_CONFIG";

/// Configuration file used when the variable is unset
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let (config, from_file) = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    // Held until exit so the file writer flushes
    let _log_guard = logging::init(&config.logging)?;

    info!("Joy Motor Bridge v{} starting...", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Loaded configuration from {}", config_path);
    } else {
        info!("No configuration at {}, using defaults", config_path);
    }

    let mapper = CommandMapper::from_config(&config);
    let sinks = mapper.bindings().map(|b| SimulatedMotor::new(b.motor_id));
    let mut bridge = Bridge::new(mapper, sinks);
    bridge
        .connect(&config.bus.interface)
        .with_context(|| format!("Failed to attach motors on {}", config.bus.interface))?;

    let mut source = ReportSource::new(BufReader::new(tokio::io::stdin()));

    info!("Reading input reports from stdin");
    info!("Press Ctrl+C to exit");

    let reason = bridge::run(&mut bridge, &mut source).await?;
    info!("Stopped ({:?}) after {} reports", reason, bridge.frames());

    Ok(())
}
