//! Reference driver for a DC motor on an H-bridge with a quadrature encoder.
//!
//! Two direction inputs select the bridge mode and one PWM channel sets the
//! power, the L298 arrangement:
//!
//! | IN1 | IN2 | PWM  | bridge  |
//! |-----|-----|------|---------|
//! | H   | L   | duty | forward |
//! | L   | H   | duty | reverse |
//! | L   | L   | off  | coast   |
//! | H   | H   | on   | brake   |
//!
//! Encoder decoding and timing are left to the board: the owner feeds
//! counted pulses through [`HBridgeMotor::count_pulses`] and elapsed time
//! through [`HBridgeMotor::tick`], then polls the device.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::error::DriverFault;
use crate::mode::{
    EncoderMode, MotionState, MotorType, PolarityMode, PositionMode, RegulationMode, RunMode,
    StopMode,
};
use crate::motor::{MotionEvent, MotorSettings, PidGain, TachoMotorDriver};
use crate::validate::{Attribute, MAX_DUTY_CYCLE_SP};

/// Nominal top speed of the large tacho motor, pulses per second.
pub const TACHO_MAX_PPS: i32 = 1020;

/// Nominal top speed of the mini tacho motor, pulses per second.
pub const MINITACHO_MAX_PPS: i32 = 1560;

/// Window over which pulses are averaged into a speed.
pub const SPEED_WINDOW_MS: u32 = 100;

/// Smallest duty used while closing on a position target.
pub const MIN_APPROACH_DUTY: i32 = 10;

/// Nominal top speed of `motor_type`.
pub fn max_pulses_per_second(motor_type: MotorType) -> i32 {
    match motor_type {
        MotorType::Tacho => TACHO_MAX_PPS,
        MotorType::MiniTacho => MINITACHO_MAX_PPS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bridge {
    Forward,
    Reverse,
    Coast,
    Brake,
}

/// Tacho motor on two bridge inputs and a PWM channel.
#[derive(Debug)]
pub struct HBridgeMotor<IN1, IN2, PWM> {
    in1: IN1,
    in2: IN2,
    pwm: PWM,
    settings: MotorSettings,
    /// Last mode written to the inputs; `None` until the first write.
    bridge: Option<Bridge>,
    position: i32,
    pulses_per_second: i32,
    duty_cycle: i32,
    window_pulses: i32,
    window_ms: u32,
    /// Time spent in the current phase.
    phase_ms: u32,
    /// Time since the run left its setup state.
    run_ms: u32,
    target: i32,
    /// Sign of the distance to `target` when the run started.
    direction: i32,
    /// Duty when deceleration started.
    ramp_from: i32,
    /// Fault raised while entering a state, reported on the next poll.
    fault: Option<DriverFault>,
}

impl<IN1, IN2, PWM> HBridgeMotor<IN1, IN2, PWM>
where
    IN1: OutputPin,
    IN2: OutputPin,
    PWM: SetDutyCycle,
{
    /// Create a driver with power-on settings. The bridge is not touched
    /// until the first state change.
    pub fn new(in1: IN1, in2: IN2, pwm: PWM) -> Self {
        Self {
            in1,
            in2,
            pwm,
            settings: MotorSettings::default(),
            bridge: None,
            position: 0,
            pulses_per_second: 0,
            duty_cycle: 0,
            window_pulses: 0,
            window_ms: 0,
            phase_ms: 0,
            run_ms: 0,
            target: 0,
            direction: 0,
            ramp_from: 0,
            fault: None,
        }
    }

    /// Stored settings.
    pub fn settings(&self) -> &MotorSettings {
        &self.settings
    }

    /// Position target of the current position run.
    pub fn target(&self) -> i32 {
        self.target
    }

    /// Release the pins and the PWM channel.
    pub fn release(self) -> (IN1, IN2, PWM) {
        (self.in1, self.in2, self.pwm)
    }

    /// Account for `delta` encoder pulses. Honours the encoder mode.
    pub fn count_pulses(&mut self, delta: i32) {
        let delta = match self.settings.encoder_mode {
            EncoderMode::Normal => delta,
            EncoderMode::Inverted => delta.wrapping_neg(),
        };
        self.position = self.position.wrapping_add(delta);
        self.window_pulses = self.window_pulses.saturating_add(delta);
    }

    /// Advance the driver clock by `elapsed_ms`.
    ///
    /// Speed is recomputed each time a full [`SPEED_WINDOW_MS`] has passed.
    pub fn tick(&mut self, elapsed_ms: u32) {
        self.phase_ms = self.phase_ms.saturating_add(elapsed_ms);
        self.run_ms = self.run_ms.saturating_add(elapsed_ms);
        self.window_ms = self.window_ms.saturating_add(elapsed_ms);
        if self.window_ms >= SPEED_WINDOW_MS {
            let pps = i64::from(self.window_pulses) * 1000 / i64::from(self.window_ms);
            self.pulses_per_second = pps.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
            self.window_pulses = 0;
            self.window_ms = 0;
        }
    }

    /// Duty the current settings ask for.
    ///
    /// With regulation on the speed setpoint is mapped onto the motor
    /// type's nominal top speed.
    fn commanded_duty(&self) -> i32 {
        let duty = match self.settings.regulation_mode {
            RegulationMode::Off => self.settings.duty_cycle_sp,
            RegulationMode::On => {
                let max = i64::from(max_pulses_per_second(self.settings.motor_type));
                (i64::from(self.settings.pulses_per_second_sp) * 100 / max) as i32
            }
        };
        if self.settings.run_mode == RunMode::Position {
            duty.abs() * self.direction
        } else {
            duty
        }
    }

    fn remaining(&self) -> i32 {
        self.target.wrapping_sub(self.position)
    }

    fn target_passed(&self) -> bool {
        self.direction == 0 || self.remaining().signum() != self.direction
    }

    fn begin_run(&mut self) {
        self.run_ms = 0;
        self.phase_ms = 0;
        self.target = match self.settings.position_mode {
            PositionMode::Absolute => self.settings.position_sp,
            PositionMode::Relative => self.position.wrapping_add(self.settings.position_sp),
        };
        self.direction = self.remaining().signum();
    }

    fn set_bridge(&mut self, bridge: Bridge) -> Result<(), DriverFault> {
        if self.bridge == Some(bridge) {
            return Ok(());
        }
        let (in1, in2) = match bridge {
            Bridge::Forward => (true, false),
            Bridge::Reverse => (false, true),
            Bridge::Coast => (false, false),
            Bridge::Brake => (true, true),
        };
        // Drop the active input first so both sides never conduct together
        // on a direction change.
        if !in1 {
            self.in1.set_low().map_err(|_| DriverFault::Pin)?;
        }
        if !in2 {
            self.in2.set_low().map_err(|_| DriverFault::Pin)?;
        }
        if in1 {
            self.in1.set_high().map_err(|_| DriverFault::Pin)?;
        }
        if in2 {
            self.in2.set_high().map_err(|_| DriverFault::Pin)?;
        }
        self.bridge = Some(bridge);
        Ok(())
    }

    /// Drive at `duty` percent, sign selecting direction.
    fn drive(&mut self, duty: i32) -> Result<(), DriverFault> {
        let duty = duty.clamp(-MAX_DUTY_CYCLE_SP, MAX_DUTY_CYCLE_SP);
        let physical = match self.settings.polarity_mode {
            PolarityMode::Normal => duty,
            PolarityMode::Inverted => -duty,
        };
        let bridge = match physical {
            d if d > 0 => Bridge::Forward,
            d if d < 0 => Bridge::Reverse,
            _ => Bridge::Coast,
        };
        self.set_bridge(bridge)?;
        // |duty| <= 100 after the clamp
        self.pwm
            .set_duty_cycle_percent(physical.unsigned_abs() as u8)
            .map_err(|_| DriverFault::Pwm)?;
        self.duty_cycle = duty;
        Ok(())
    }

    fn apply_stop_mode(&mut self) -> Result<(), DriverFault> {
        match self.settings.stop_mode {
            StopMode::Coast => {
                self.set_bridge(Bridge::Coast)?;
                self.pwm.set_duty_cycle_fully_off().map_err(|_| DriverFault::Pwm)?;
            }
            // Holding is a shorted bridge here; there is no position loop.
            StopMode::Brake | StopMode::Hold => {
                self.set_bridge(Bridge::Brake)?;
                self.pwm.set_duty_cycle_fully_on().map_err(|_| DriverFault::Pwm)?;
            }
        }
        self.duty_cycle = 0;
        Ok(())
    }

    fn on_enter(&mut self, state: MotionState) -> Result<(), DriverFault> {
        match state {
            MotionState::RunForever => {
                self.begin_run();
                self.drive(self.commanded_duty())
            }
            MotionState::SetupRampTime
            | MotionState::SetupRampPosition
            | MotionState::SetupRampRegulation => {
                self.begin_run();
                Ok(())
            }
            MotionState::RampUp => {
                self.run_ms = 0;
                self.phase_ms = 0;
                Ok(())
            }
            MotionState::RampConst => self.drive(self.commanded_duty()),
            MotionState::RampDown | MotionState::PositionRampDown => {
                self.phase_ms = 0;
                self.ramp_from = self.duty_cycle;
                Ok(())
            }
            MotionState::Stop => self.apply_stop_mode(),
            MotionState::Idle => Ok(()),
        }
    }

    fn ramp_down_due(&self) -> bool {
        match self.settings.run_mode {
            RunMode::Time => {
                let end = i64::from(self.run_ms) + i64::from(self.settings.ramp_down_sp);
                end >= i64::from(self.settings.time_sp)
            }
            RunMode::Position => {
                if self.target_passed() {
                    return true;
                }
                // Linear deceleration covers half the distance full speed would
                let braking = i64::from(self.pulses_per_second).abs()
                    * i64::from(self.settings.ramp_down_sp)
                    / 2000;
                i64::from(self.remaining()).abs() <= braking
            }
            RunMode::Forever => false,
        }
    }

    /// `from` scaled by `num / den`, for linear ramps.
    fn scaled(from: i32, num: u32, den: i32) -> i32 {
        (i64::from(from) * i64::from(num) / i64::from(den)) as i32
    }
}

impl<IN1, IN2, PWM> TachoMotorDriver for HBridgeMotor<IN1, IN2, PWM>
where
    IN1: OutputPin,
    IN2: OutputPin,
    PWM: SetDutyCycle,
{
    fn motor_type(&self) -> MotorType {
        self.settings.motor_type
    }

    fn set_motor_type(&mut self, motor_type: MotorType) {
        self.settings.motor_type = motor_type;
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    fn duty_cycle(&self) -> i32 {
        self.duty_cycle
    }

    fn pulses_per_second(&self) -> i32 {
        self.pulses_per_second
    }

    fn run_mode(&self) -> RunMode {
        self.settings.run_mode
    }

    fn set_run_mode(&mut self, mode: RunMode) {
        self.settings.run_mode = mode;
    }

    fn regulation_mode(&self) -> RegulationMode {
        self.settings.regulation_mode
    }

    fn set_regulation_mode(&mut self, mode: RegulationMode) {
        self.settings.regulation_mode = mode;
    }

    fn stop_mode(&self) -> StopMode {
        self.settings.stop_mode
    }

    fn set_stop_mode(&mut self, mode: StopMode) {
        self.settings.stop_mode = mode;
    }

    fn position_mode(&self) -> PositionMode {
        self.settings.position_mode
    }

    fn set_position_mode(&mut self, mode: PositionMode) {
        self.settings.position_mode = mode;
    }

    fn polarity_mode(&self) -> PolarityMode {
        self.settings.polarity_mode
    }

    fn set_polarity_mode(&mut self, mode: PolarityMode) {
        self.settings.polarity_mode = mode;
    }

    fn encoder_mode(&self) -> EncoderMode {
        self.settings.encoder_mode
    }

    fn set_encoder_mode(&mut self, mode: EncoderMode) {
        self.settings.encoder_mode = mode;
    }

    fn duty_cycle_sp(&self) -> i32 {
        self.settings.duty_cycle_sp
    }

    fn set_duty_cycle_sp(&mut self, value: i32) {
        self.settings.duty_cycle_sp = value;
    }

    fn pulses_per_second_sp(&self) -> i32 {
        self.settings.pulses_per_second_sp
    }

    fn set_pulses_per_second_sp(&mut self, value: i32) {
        self.settings.pulses_per_second_sp = value;
    }

    fn time_sp(&self) -> i32 {
        self.settings.time_sp
    }

    fn set_time_sp(&mut self, value: i32) {
        self.settings.time_sp = value;
    }

    fn position_sp(&self) -> i32 {
        self.settings.position_sp
    }

    fn set_position_sp(&mut self, value: i32) {
        self.settings.position_sp = value;
    }

    fn ramp_up_sp(&self) -> i32 {
        self.settings.ramp_up_sp
    }

    fn set_ramp_up_sp(&mut self, value: i32) {
        self.settings.ramp_up_sp = value;
    }

    fn ramp_down_sp(&self) -> i32 {
        self.settings.ramp_down_sp
    }

    fn set_ramp_down_sp(&mut self, value: i32) {
        self.settings.ramp_down_sp = value;
    }

    fn speed_regulation(&self, gain: PidGain) -> i32 {
        self.settings.pid.get(gain)
    }

    fn set_speed_regulation(&mut self, gain: PidGain, value: i32) {
        self.settings.pid.set(gain, value);
    }

    fn reset(&mut self) {
        self.settings.clear_setpoints();
        self.position = 0;
        self.pulses_per_second = 0;
        self.window_pulses = 0;
        self.window_ms = 0;
        self.target = 0;
        self.direction = 0;
    }

    fn enter_state(&mut self, state: MotionState) {
        if let Err(fault) = self.on_enter(state) {
            warn!("h-bridge: fault entering {}", state);
            self.fault = Some(fault);
        }
    }

    fn poll(&mut self, state: MotionState) -> Result<Option<MotionEvent>, DriverFault> {
        if let Some(fault) = self.fault.take() {
            return Err(fault);
        }

        let event = match state {
            MotionState::Idle => None,
            MotionState::RunForever => {
                // Follows setpoint changes made while running
                self.drive(self.commanded_duty())?;
                None
            }
            MotionState::SetupRampTime
            | MotionState::SetupRampPosition
            | MotionState::SetupRampRegulation => Some(MotionEvent::SetupComplete),
            MotionState::RampUp => {
                let target = self.commanded_duty();
                let ramp = self.settings.ramp_up_sp;
                if ramp <= 0 || self.phase_ms >= ramp as u32 {
                    self.drive(target)?;
                    Some(MotionEvent::RampUpComplete)
                } else {
                    self.drive(Self::scaled(target, self.phase_ms, ramp))?;
                    None
                }
            }
            MotionState::RampConst => {
                if self.ramp_down_due() {
                    Some(MotionEvent::RampDownTriggered)
                } else {
                    self.drive(self.commanded_duty())?;
                    None
                }
            }
            MotionState::RampDown => {
                let ramp = self.settings.ramp_down_sp;
                if ramp <= 0 || self.phase_ms >= ramp as u32 {
                    self.drive(0)?;
                    Some(MotionEvent::RampDownComplete)
                } else {
                    let left = ramp as u32 - self.phase_ms;
                    self.drive(Self::scaled(self.ramp_from, left, ramp))?;
                    None
                }
            }
            MotionState::PositionRampDown => {
                if self.target_passed() {
                    Some(MotionEvent::TargetReached)
                } else {
                    let ramp = self.settings.ramp_down_sp;
                    let from = self.ramp_from.abs();
                    let duty = if ramp <= 0 || self.phase_ms >= ramp as u32 {
                        0
                    } else {
                        Self::scaled(from, ramp as u32 - self.phase_ms, ramp)
                    };
                    self.drive(duty.max(MIN_APPROACH_DUTY) * self.direction)?;
                    None
                }
            }
            // The stop policy was applied on entry
            MotionState::Stop => Some(MotionEvent::StopApplied),
        };
        Ok(event)
    }

    fn can_modify(&self, attribute: Attribute, state: MotionState) -> bool {
        let locked = matches!(
            attribute,
            Attribute::Type
                | Attribute::RunMode
                | Attribute::RegulationMode
                | Attribute::PositionMode
                | Attribute::PolarityMode
                | Attribute::EncoderMode
        );
        !(locked && state.is_active())
    }
}
