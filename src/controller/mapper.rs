//! # Command Mapper Module
//!
//! Turns one [`InputReport`] plus the previous [`MapperState`] into four motor
//! velocity commands and the next state.
//!
//! ## Frame Pipeline
//!
//! 1. **Deadman** - the trigger axis must read below the deadman threshold.
//! 2. **Face buttons** - cross, circle, square and triangle each select one
//!    motor; L1 inverts the direction.
//! 3. **Speed ramp** - the vertical d-pad nudges the base speed by one step on
//!    each new press (edge triggered, never while held).
//! 4. **Synthesis** - with the deadman held and at least one face button down,
//!    each selected motor gets `±base_speed`; everything else gets zero.
//!
//! Missing buttons read as released and missing axes as neutral, so a short
//! or malformed report never fails a frame.
//!
//! ## Usage
//!
//! ```
//! use joy_motor_bridge::config::Config;
//! use joy_motor_bridge::controller::mapper::CommandMapper;
//! use joy_motor_bridge::controller::report::InputReport;
//!
//! let mapper = CommandMapper::from_config(&Config::default());
//! let state = mapper.initial_state();
//!
//! // L2 held (axis 3 < 0) with cross (button 1) pressed
//! let mut axes = vec![0.0; 8];
//! axes[3] = -1.0;
//! let report = InputReport::new(axes, vec![0, 1, 0, 0, 0]);
//!
//! let (frame, _next) = mapper.process(&report, state);
//! assert_eq!(frame.commands[0].velocity, 100.0); // cross motor
//! assert_eq!(frame.commands[1].velocity, 0.0);
//! ```

use super::report::InputReport;
use crate::config::{Config, InputConfig, RampConfig};
use crate::motor::{MotorBinding, MotorBindings, MOTOR_COUNT};

/// Classification of the vertical d-pad axis for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DpadState {
    Up,
    #[default]
    Neutral,
    Down,
}

/// The four face buttons, each bound to one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceButton {
    Cross,
    Circle,
    Square,
    Triangle,
}

impl FaceButton {
    /// All face buttons in command order.
    pub const ALL: [FaceButton; MOTOR_COUNT] = [
        FaceButton::Cross,
        FaceButton::Circle,
        FaceButton::Square,
        FaceButton::Triangle,
    ];

    /// Lowercase button name for logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FaceButton::Cross => "cross",
            FaceButton::Circle => "circle",
            FaceButton::Square => "square",
            FaceButton::Triangle => "triangle",
        }
    }
}

impl std::fmt::Display for FaceButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// State carried from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapperState {
    /// Ramped speed magnitude, always within the configured bounds.
    pub base_speed: f32,
    /// D-pad classification of the most recently processed report.
    pub prev_dpad: DpadState,
}

impl MapperState {
    /// Creates a state with the given base speed and a neutral d-pad.
    #[must_use]
    pub fn new(base_speed: f32) -> Self {
        Self {
            base_speed,
            prev_dpad: DpadState::Neutral,
        }
    }
}

/// Velocity command for a single motor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorCommand {
    pub motor_id: u32,
    pub velocity: f32,
}

/// Output of one processed report.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedFrame {
    /// One command per motor, in binding order.
    pub commands: [MotorCommand; MOTOR_COUNT],
    /// Deadman trigger held this frame.
    pub deadman_active: bool,
    /// Raw d-pad axis value, if the report carried it.
    pub dpad_value: Option<f32>,
    /// D-pad classification this frame.
    pub dpad: DpadState,
    /// Ramp edge that fired this frame (`Up` or `Down`), if any.
    pub speed_change: Option<DpadState>,
    /// Auxiliary axis value (0.0 when absent).
    pub aux_axis: f32,
}

impl MappedFrame {
    /// Returns true if any motor is commanded to move.
    #[must_use]
    pub fn any_motion(&self) -> bool {
        self.commands.iter().any(|c| c.velocity != 0.0)
    }
}

/// Maps input reports to motor commands.
///
/// `CommandMapper` holds only static configuration; all per-frame state is
/// passed in and returned by [`CommandMapper::process`].
#[derive(Debug, Clone)]
pub struct CommandMapper {
    input: InputConfig,
    ramp: RampConfig,
    bindings: MotorBindings,
}

impl CommandMapper {
    /// Creates a mapper from explicit layout, ramp and binding settings.
    #[must_use]
    pub fn new(input: InputConfig, ramp: RampConfig, bindings: MotorBindings) -> Self {
        Self {
            input,
            ramp,
            bindings,
        }
    }

    /// Creates a mapper from a loaded [`Config`].
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.input.clone(),
            config.ramp.clone(),
            MotorBinding::from_config(&config.motors),
        )
    }

    /// State to start from before the first report.
    #[must_use]
    pub fn initial_state(&self) -> MapperState {
        MapperState::new(
            self.ramp
                .initial_speed
                .max(self.ramp.min_speed)
                .min(self.ramp.max_speed),
        )
    }

    /// Motor bindings in command order.
    #[must_use]
    pub fn bindings(&self) -> &MotorBindings {
        &self.bindings
    }

    /// Processes one report.
    ///
    /// Returns the commands for this frame together with the state to use for
    /// the next one. The ramp and `prev_dpad` update regardless of the deadman.
    #[must_use]
    pub fn process(&self, report: &InputReport, state: MapperState) -> (MappedFrame, MapperState) {
        let deadman_active = self.deadman_active(report);

        let any_face = FaceButton::ALL
            .iter()
            .any(|&button| self.face_pressed(report, button));
        let invert = report.button_is(self.input.invert_button, self.input.pressed_value);

        let dpad_value = report.axis(self.input.dpad_vertical_axis);
        let dpad = dpad_value.map_or(DpadState::Neutral, |v| self.classify_dpad(v));

        let speed_change = (dpad != state.prev_dpad && dpad != DpadState::Neutral).then_some(dpad);
        let base_speed = match speed_change {
            Some(DpadState::Up) => (state.base_speed + self.ramp.step).min(self.ramp.max_speed),
            Some(DpadState::Down) => (state.base_speed - self.ramp.step).max(self.ramp.min_speed),
            _ => state.base_speed,
        };

        let command = if invert { -base_speed } else { base_speed };
        // Deadman gate first: without trigger and a face button nothing moves
        let enabled = deadman_active && any_face;

        let commands = self.bindings.map(|binding| MotorCommand {
            motor_id: binding.motor_id,
            velocity: if enabled && self.face_pressed(report, binding.control) {
                command
            } else {
                0.0
            },
        });

        let frame = MappedFrame {
            commands,
            deadman_active,
            dpad_value,
            dpad,
            speed_change,
            aux_axis: report.axis(self.input.aux_axis).unwrap_or(0.0),
        };
        let next = MapperState {
            base_speed,
            prev_dpad: dpad,
        };

        (frame, next)
    }

    /// Deadman is active iff the trigger axis exists and reads below threshold.
    fn deadman_active(&self, report: &InputReport) -> bool {
        report
            .axis(self.input.deadman_axis)
            .is_some_and(|v| v < self.input.deadman_threshold)
    }

    fn face_pressed(&self, report: &InputReport, button: FaceButton) -> bool {
        let index = match button {
            FaceButton::Cross => self.input.cross_button,
            FaceButton::Circle => self.input.circle_button,
            FaceButton::Square => self.input.square_button,
            FaceButton::Triangle => self.input.triangle_button,
        };
        report.button_is(index, self.input.pressed_value)
    }

    /// Classifies a d-pad axis value, honouring the configured polarity.
    fn classify_dpad(&self, value: f32) -> DpadState {
        let threshold = self.ramp.dpad_threshold;
        let (positive, negative) = if self.input.dpad_up_positive {
            (DpadState::Up, DpadState::Down)
        } else {
            (DpadState::Down, DpadState::Up)
        };

        if value > threshold {
            positive
        } else if value < -threshold {
            negative
        } else {
            DpadState::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CROSS: usize = 1;
    const CIRCLE: usize = 2;
    const SQUARE: usize = 0;
    const TRIANGLE: usize = 3;
    const L1: usize = 4;

    fn mapper() -> CommandMapper {
        CommandMapper::from_config(&Config::default())
    }

    /// Builds a full-length report with the given trigger, d-pad and buttons.
    fn report(trigger: f32, dpad: f32, pressed: &[usize]) -> InputReport {
        let mut axes = vec![0.0; 8];
        axes[3] = trigger;
        axes[7] = dpad;
        let mut buttons = vec![0; 5];
        for &b in pressed {
            buttons[b] = 1;
        }
        InputReport::new(axes, buttons)
    }

    fn dpad(value: f32) -> InputReport {
        report(0.0, value, &[])
    }

    fn velocities(frame: &MappedFrame) -> [f32; 4] {
        frame.commands.map(|c| c.velocity)
    }

    fn run(mapper: &CommandMapper, mut state: MapperState, reports: &[InputReport]) -> MapperState {
        for r in reports {
            state = mapper.process(r, state).1;
        }
        state
    }

    // ==================== Deadman Tests ====================

    #[test]
    fn test_missing_trigger_axis_is_inactive() {
        let mapper = mapper();
        let r = InputReport::new(vec![-1.0, -1.0, -1.0], vec![1, 1, 1, 1, 0]);
        let (frame, _) = mapper.process(&r, mapper.initial_state());

        assert!(!frame.deadman_active);
        assert_eq!(velocities(&frame), [0.0; 4]);
    }

    #[test]
    fn test_trigger_at_threshold_is_inactive() {
        let mapper = mapper();
        let (frame, _) = mapper.process(&report(0.0, 0.0, &[CROSS]), mapper.initial_state());
        assert!(!frame.deadman_active);
        assert_eq!(velocities(&frame), [0.0; 4]);
    }

    #[test]
    fn test_deadman_inactive_zeroes_every_combination() {
        let mapper = mapper();
        let faces = [CROSS, CIRCLE, SQUARE, TRIANGLE];
        for mask in 0u8..16 {
            let pressed: Vec<usize> = (0..4)
                .filter(|i| mask & (1 << i) != 0)
                .map(|i| faces[i])
                .collect();
            let (frame, _) = mapper.process(&report(0.5, 0.0, &pressed), mapper.initial_state());
            assert_eq!(velocities(&frame), [0.0; 4], "mask {:04b}", mask);
        }
    }

    #[test]
    fn test_deadman_without_face_button_is_idle() {
        let mapper = mapper();
        let (frame, _) = mapper.process(&report(-1.0, 0.0, &[L1]), mapper.initial_state());
        assert!(frame.deadman_active);
        assert!(!frame.any_motion());
    }

    // ==================== Routing Tests ====================

    #[test]
    fn test_cross_only_drives_cross_motor() {
        let mapper = mapper();
        let (frame, _) = mapper.process(&report(-1.0, 0.0, &[CROSS]), MapperState::new(100.0));

        assert_eq!(frame.commands[0], MotorCommand { motor_id: 12, velocity: 100.0 });
        assert_eq!(frame.commands[1], MotorCommand { motor_id: 2, velocity: 0.0 });
        assert_eq!(frame.commands[2], MotorCommand { motor_id: 3, velocity: 0.0 });
        assert_eq!(frame.commands[3], MotorCommand { motor_id: 4, velocity: 0.0 });
    }

    #[test]
    fn test_l1_inverts_direction() {
        let mapper = mapper();
        let (frame, _) =
            mapper.process(&report(-1.0, 0.0, &[CROSS, L1]), MapperState::new(150.0));
        assert_eq!(velocities(&frame), [-150.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_multiple_face_buttons() {
        let mapper = mapper();
        let (frame, _) = mapper.process(
            &report(-0.2, 0.0, &[CIRCLE, TRIANGLE]),
            MapperState::new(80.0),
        );
        assert_eq!(velocities(&frame), [0.0, 80.0, 0.0, 80.0]);
    }

    #[test]
    fn test_all_face_buttons_inverted() {
        let mapper = mapper();
        let (frame, _) = mapper.process(
            &report(-1.0, 0.0, &[CROSS, CIRCLE, SQUARE, TRIANGLE, L1]),
            MapperState::new(40.0),
        );
        assert_eq!(velocities(&frame), [-40.0; 4]);
    }

    #[test]
    fn test_button_value_other_than_one_is_released() {
        let mapper = mapper();
        let mut r = report(-1.0, 0.0, &[]);
        r.buttons[CROSS] = 2;
        let (frame, _) = mapper.process(&r, mapper.initial_state());
        assert!(!frame.any_motion());
    }

    #[test]
    fn test_short_button_array() {
        let mapper = mapper();
        // Only square (0) and cross (1) present; L1 missing reads as released
        let mut axes = vec![0.0; 8];
        axes[3] = -1.0;
        let r = InputReport::new(axes, vec![0, 1]);
        let (frame, _) = mapper.process(&r, MapperState::new(100.0));
        assert_eq!(velocities(&frame), [100.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_report_never_moves() {
        let mapper = mapper();
        let state = mapper.initial_state();
        let (frame, next) = mapper.process(&InputReport::default(), state);

        assert!(!frame.any_motion());
        assert_eq!(frame.dpad_value, None);
        assert_eq!(frame.aux_axis, 0.0);
        assert_eq!(next, state);
    }

    #[test]
    fn test_custom_bindings_follow_config() {
        let mut config = Config::default();
        config.motors.circle = 21;
        let mapper = CommandMapper::from_config(&config);
        let (frame, _) = mapper.process(&report(-1.0, 0.0, &[CIRCLE]), MapperState::new(10.0));
        assert_eq!(frame.commands[1], MotorCommand { motor_id: 21, velocity: 10.0 });
    }

    // ==================== Ramp Tests ====================

    #[test]
    fn test_initial_state() {
        let state = mapper().initial_state();
        assert_eq!(state.base_speed, 100.0);
        assert_eq!(state.prev_dpad, DpadState::Neutral);
    }

    #[test]
    fn test_classification() {
        let mapper = mapper();
        assert_eq!(mapper.classify_dpad(1.0), DpadState::Up);
        assert_eq!(mapper.classify_dpad(0.51), DpadState::Up);
        assert_eq!(mapper.classify_dpad(0.5), DpadState::Neutral);
        assert_eq!(mapper.classify_dpad(0.0), DpadState::Neutral);
        assert_eq!(mapper.classify_dpad(-0.5), DpadState::Neutral);
        assert_eq!(mapper.classify_dpad(-0.51), DpadState::Down);
        assert_eq!(mapper.classify_dpad(-1.0), DpadState::Down);
    }

    #[test]
    fn test_inverted_polarity() {
        let mut config = Config::default();
        config.input.dpad_up_positive = false;
        let mapper = CommandMapper::from_config(&config);

        assert_eq!(mapper.classify_dpad(1.0), DpadState::Down);
        assert_eq!(mapper.classify_dpad(-1.0), DpadState::Up);

        let next = run(&mapper, MapperState::new(100.0), &[dpad(-1.0)]);
        assert_eq!(next.base_speed, 110.0);
    }

    #[test]
    fn test_held_press_adjusts_once() {
        let mapper = mapper();
        let reports = vec![dpad(1.0); 25];
        let next = run(&mapper, MapperState::new(100.0), &reports);
        assert_eq!(next.base_speed, 110.0);
        assert_eq!(next.prev_dpad, DpadState::Up);
    }

    #[test]
    fn test_press_release_press_adjusts_twice() {
        let mapper = mapper();
        let next = run(
            &mapper,
            MapperState::new(100.0),
            &[dpad(1.0), dpad(0.0), dpad(1.0)],
        );
        assert_eq!(next.base_speed, 120.0);
    }

    #[test]
    fn test_neutral_up_neutral_up() {
        let mapper = mapper();
        let next = run(
            &mapper,
            MapperState::new(100.0),
            &[dpad(0.0), dpad(1.0), dpad(0.0), dpad(1.0)],
        );
        assert_eq!(next.base_speed, 120.0);
    }

    #[test]
    fn test_up_down_without_neutral() {
        let mapper = mapper();
        let (frame, state) = mapper.process(&dpad(1.0), MapperState::new(100.0));
        assert_eq!(frame.speed_change, Some(DpadState::Up));
        assert_eq!(state.base_speed, 110.0);

        let (frame, state) = mapper.process(&dpad(-1.0), state);
        assert_eq!(frame.speed_change, Some(DpadState::Down));
        assert_eq!(state.base_speed, 100.0);

        let (frame, state) = mapper.process(&dpad(1.0), state);
        assert_eq!(frame.speed_change, Some(DpadState::Up));
        assert_eq!(state.base_speed, 110.0);
    }

    #[test]
    fn test_release_does_not_adjust() {
        let mapper = mapper();
        let state = MapperState {
            base_speed: 50.0,
            prev_dpad: DpadState::Down,
        };
        let (frame, next) = mapper.process(&dpad(0.0), state);
        assert_eq!(frame.speed_change, None);
        assert_eq!(next.base_speed, 50.0);
        assert_eq!(next.prev_dpad, DpadState::Neutral);
    }

    #[test]
    fn test_ramp_caps_at_max() {
        let mapper = mapper();
        let reports: Vec<_> = (0..40).flat_map(|_| [dpad(1.0), dpad(0.0)]).collect();
        let next = run(&mapper, MapperState::new(0.0), &reports);
        assert_eq!(next.base_speed, 300.0);
    }

    #[test]
    fn test_ramp_floors_at_min() {
        let mapper = mapper();
        let reports: Vec<_> = (0..40).flat_map(|_| [dpad(-1.0), dpad(0.0)]).collect();
        let next = run(&mapper, MapperState::new(100.0), &reports);
        assert_eq!(next.base_speed, 0.0);
    }

    #[test]
    fn test_ramp_stays_in_bounds() {
        let mapper = mapper();
        let pattern = [1.0, 1.0, 0.0, -1.0, 1.0, -0.7, 0.9, 0.2, -1.0, -1.0];
        let mut state = MapperState::new(0.0);
        for i in 0..500 {
            state = mapper.process(&dpad(pattern[(i * 7) % pattern.len()]), state).1;
            assert!((0.0..=300.0).contains(&state.base_speed));
        }
    }

    #[test]
    fn test_neutral_replay_is_idempotent() {
        let mapper = mapper();
        let state = MapperState::new(130.0);
        let (_, once) = mapper.process(&dpad(0.1), state);
        let (_, twice) = mapper.process(&dpad(0.1), once);
        assert_eq!(once.base_speed, 130.0);
        assert_eq!(twice.base_speed, 130.0);
    }

    #[test]
    fn test_missing_dpad_axis_reads_neutral() {
        let mapper = mapper();
        let state = MapperState {
            base_speed: 70.0,
            prev_dpad: DpadState::Up,
        };
        let r = InputReport::new(vec![0.0; 4], vec![]);
        let (frame, next) = mapper.process(&r, state);
        assert_eq!(frame.dpad_value, None);
        assert_eq!(frame.dpad, DpadState::Neutral);
        assert_eq!(next.prev_dpad, DpadState::Neutral);
        assert_eq!(next.base_speed, 70.0);
    }

    #[test]
    fn test_ramp_applies_before_synthesis() {
        let mapper = mapper();
        let (frame, next) = mapper.process(&report(-1.0, 1.0, &[SQUARE]), MapperState::new(100.0));
        assert_eq!(next.base_speed, 110.0);
        assert_eq!(velocities(&frame), [0.0, 0.0, 110.0, 0.0]);
    }

    #[test]
    fn test_ramp_updates_while_deadman_released() {
        let mapper = mapper();
        let (frame, next) = mapper.process(&report(1.0, -1.0, &[CROSS]), MapperState::new(100.0));
        assert!(!frame.any_motion());
        assert_eq!(next.base_speed, 90.0);
        assert_eq!(next.prev_dpad, DpadState::Down);
    }

    #[test]
    fn test_aux_axis_reported() {
        let mapper = mapper();
        let mut r = report(0.0, 0.0, &[]);
        r.axes[4] = -0.75;
        let (frame, _) = mapper.process(&r, mapper.initial_state());
        assert_eq!(frame.aux_axis, -0.75);
    }

    #[test]
    fn test_face_button_names() {
        let names: Vec<_> = FaceButton::ALL.iter().map(|b| b.to_string()).collect();
        assert_eq!(names, ["cross", "circle", "square", "triangle"]);
    }
}
