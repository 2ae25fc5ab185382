//! # Bridge Module
//!
//! The adapter between the report stream and the motors. It owns the
//! [`CommandMapper`], the [`MapperState`] and one [`MotorChannel`] per face
//! button, and threads state through successive reports.
//!
//! ## Frame Handling
//!
//! 1. Map the report and commit the next state as a whole
//! 2. Send every motor its command, recording a result per send
//! 3. Emit the frame's diagnostics once all sends have completed
//!
//! Send failures are logged and reported but never touch the mapper state.
//!
//! ## Usage
//!
//! ```
//! use joy_motor_bridge::bridge::Bridge;
//! use joy_motor_bridge::config::Config;
//! use joy_motor_bridge::controller::mapper::CommandMapper;
//! use joy_motor_bridge::controller::report::InputReport;
//! use joy_motor_bridge::motor::SimulatedMotor;
//!
//! let mapper = CommandMapper::from_config(&Config::default());
//! let sinks = mapper.bindings().map(|b| SimulatedMotor::new(b.motor_id));
//! let mut bridge = Bridge::new(mapper, sinks);
//! bridge.connect("can0")?;
//!
//! let frame = bridge.handle_report(&InputReport::default());
//! assert!(frame.sends.all_ok());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::future::Future;

use tokio::io::AsyncBufRead;
use tracing::{debug, info, warn};

use crate::controller::mapper::{CommandMapper, MappedFrame, MapperState, MotorCommand};
use crate::controller::report::InputReport;
use crate::controller::source::ReportSource;
use crate::error::Result;
use crate::motor::{dispatch, MotorChannel, MotorSink, SendReport, MOTOR_COUNT};

/// Everything that happened while handling one report.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: MappedFrame,
    pub sends: SendReport,
    /// State after this frame.
    pub state: MapperState,
}

/// Why [`run_until`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The report stream reached end of input.
    EndOfStream,
    /// The shutdown signal fired.
    Shutdown,
}

/// Owns mapper state and motor channels.
pub struct Bridge<S> {
    mapper: CommandMapper,
    state: MapperState,
    channels: Vec<MotorChannel<S>>,
    frames: u64,
}

impl<S: MotorSink> Bridge<S> {
    /// Pairs each of the mapper's bindings with the sink at the same position.
    pub fn new(mapper: CommandMapper, sinks: [S; MOTOR_COUNT]) -> Self {
        let channels = mapper
            .bindings()
            .iter()
            .zip(sinks)
            .map(|(&binding, sink)| MotorChannel::new(binding, sink))
            .collect();

        Self {
            state: mapper.initial_state(),
            mapper,
            channels,
            frames: 0,
        }
    }

    /// Attaches every motor to the bus. Called once before the first report.
    ///
    /// # Errors
    ///
    /// Returns `Motor` for the first motor that fails to attach.
    pub fn connect(&mut self, interface: &str) -> Result<()> {
        for channel in &mut self.channels {
            channel.sink.connect(interface)?;
            info!(
                "Motor {} ({}) connected on {}",
                channel.binding.motor_id, channel.binding.control, interface
            );
        }
        Ok(())
    }

    /// Maps one report, sends the commands and logs the frame.
    pub fn handle_report(&mut self, report: &InputReport) -> FrameReport {
        let (frame, next) = self.mapper.process(report, self.state);
        self.state = next;
        self.frames += 1;

        let sends = dispatch(&mut self.channels, &frame.commands);

        if let Some(value) = frame.dpad_value {
            debug!("dpad_y: {:.2}", value);
        }
        if let Some(direction) = frame.speed_change {
            info!("Base speed {:?} -> {:.2}", direction, self.state.base_speed);
        }
        debug!(
            "Base speed: {:.2}, R2: {:.2}, deadman: {}, commands: {:?}",
            self.state.base_speed,
            frame.aux_axis,
            frame.deadman_active,
            frame.commands.map(|c| c.velocity)
        );

        FrameReport {
            frame,
            sends,
            state: self.state,
        }
    }

    /// Commands zero velocity on every motor.
    pub fn stop_all(&mut self) -> SendReport {
        info!("Stopping all motors");
        let commands: Vec<_> = self
            .channels
            .iter()
            .map(|c| MotorCommand {
                motor_id: c.binding.motor_id,
                velocity: 0.0,
            })
            .collect();
        dispatch(&mut self.channels, &commands)
    }

    /// Current mapper state.
    pub fn state(&self) -> MapperState {
        self.state
    }

    /// Number of reports handled so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn channels(&self) -> &[MotorChannel<S>] {
        &self.channels
    }
}

/// Runs the bridge until the stream ends or Ctrl+C is received.
///
/// # Errors
///
/// Returns `Io` if reading the report stream fails. Motors are stopped first.
pub async fn run<S, R>(bridge: &mut Bridge<S>, source: &mut ReportSource<R>) -> Result<StopReason>
where
    S: MotorSink,
    R: AsyncBufRead + Unpin,
{
    run_until(bridge, source, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down...");
    })
    .await
}

/// Runs the bridge until the stream ends or `shutdown` completes.
///
/// Reports are handled one at a time; the next is not read until the current
/// frame's sends have finished. All motors are stopped before returning.
pub async fn run_until<S, R, F>(
    bridge: &mut Bridge<S>,
    source: &mut ReportSource<R>,
    shutdown: F,
) -> Result<StopReason>
where
    S: MotorSink,
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let result = loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break Ok(StopReason::Shutdown),

            next = source.next_report() => match next {
                Ok(Some(report)) => {
                    bridge.handle_report(&report);
                }
                Ok(None) => {
                    info!("Input stream ended");
                    break Ok(StopReason::EndOfStream);
                }
                Err(e) => break Err(e),
            },
        }
    };

    let stop = bridge.stop_all();
    for (motor_id, e) in stop.failures() {
        warn!("Motor {} may still be moving: {}", motor_id, e);
    }
    info!(
        "Handled {} reports ({} malformed skipped)",
        bridge.frames(),
        source.rejected()
    );

    result
}
