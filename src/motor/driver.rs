//! Capability interface implemented by concrete tacho motor drivers.
//!
//! A driver owns the physical resource (bridge, PWM channel, encoder
//! counter) and the stored settings. [`MotorDevice`](super::MotorDevice)
//! validates every value before calling in, owns the motion state machine
//! and asks the driver to act on each state it enters.

use crate::error::DriverFault;
use crate::mode::{
    EncoderMode, MotionState, MotorType, PolarityMode, PositionMode, RegulationMode, RunMode,
    StopMode,
};
use crate::validate::Attribute;

use super::settings::PidGain;
use super::state::MotionEvent;

/// Operations every tacho motor driver provides.
///
/// Setters receive values that have already passed validation and must not
/// fail; hardware problems are reported through [`poll`](Self::poll).
/// Getters must not affect motion.
pub trait TachoMotorDriver {
    /// Motor type.
    fn motor_type(&self) -> MotorType;
    /// Select the motor type.
    fn set_motor_type(&mut self, motor_type: MotorType);

    /// Measured position in encoder pulses.
    fn position(&self) -> i32;
    /// Reseed the measured position. Does not command motion.
    fn set_position(&mut self, position: i32);

    /// Duty cycle currently applied, percent.
    fn duty_cycle(&self) -> i32;
    /// Measured speed, encoder pulses per second.
    fn pulses_per_second(&self) -> i32;

    /// Run mode.
    fn run_mode(&self) -> RunMode;
    /// Select the run mode.
    fn set_run_mode(&mut self, mode: RunMode);
    /// Regulation mode.
    fn regulation_mode(&self) -> RegulationMode;
    /// Select the regulation mode.
    fn set_regulation_mode(&mut self, mode: RegulationMode);
    /// Stop mode.
    fn stop_mode(&self) -> StopMode;
    /// Select the stop mode.
    fn set_stop_mode(&mut self, mode: StopMode);
    /// Position mode.
    fn position_mode(&self) -> PositionMode;
    /// Select the position mode.
    fn set_position_mode(&mut self, mode: PositionMode);
    /// Polarity mode.
    fn polarity_mode(&self) -> PolarityMode;
    /// Select the polarity mode.
    fn set_polarity_mode(&mut self, mode: PolarityMode);
    /// Encoder mode.
    fn encoder_mode(&self) -> EncoderMode;
    /// Select the encoder mode.
    fn set_encoder_mode(&mut self, mode: EncoderMode);

    /// Duty-cycle setpoint.
    fn duty_cycle_sp(&self) -> i32;
    /// Store the duty-cycle setpoint.
    fn set_duty_cycle_sp(&mut self, value: i32);
    /// Speed setpoint.
    fn pulses_per_second_sp(&self) -> i32;
    /// Store the speed setpoint.
    fn set_pulses_per_second_sp(&mut self, value: i32);
    /// Run duration setpoint.
    fn time_sp(&self) -> i32;
    /// Store the run duration setpoint.
    fn set_time_sp(&mut self, value: i32);
    /// Position setpoint.
    fn position_sp(&self) -> i32;
    /// Store the position setpoint.
    fn set_position_sp(&mut self, value: i32);
    /// Ramp-up duration.
    fn ramp_up_sp(&self) -> i32;
    /// Store the ramp-up duration.
    fn set_ramp_up_sp(&mut self, value: i32);
    /// Ramp-down duration.
    fn ramp_down_sp(&self) -> i32;
    /// Store the ramp-down duration.
    fn set_ramp_down_sp(&mut self, value: i32);

    /// One speed regulation gain.
    fn speed_regulation(&self, gain: PidGain) -> i32;
    /// Store one speed regulation gain.
    fn set_speed_regulation(&mut self, gain: PidGain, value: i32);

    /// Clear position and setpoints. Only called while idle.
    fn reset(&mut self);

    /// Emergency stop engaged (`true`) or released (`false`).
    ///
    /// Called before the forced transition to `Stop`.
    fn emergency_stop(&mut self, engaged: bool) {
        let _ = engaged;
    }

    /// Act on entering `state`.
    ///
    /// On `Stop` the driver applies its stop mode.
    fn enter_state(&mut self, state: MotionState);

    /// Run one step of the control loop while in `state`.
    ///
    /// Returns the event that moves the state machine on, if any.
    ///
    /// # Errors
    ///
    /// A driver fault. The state machine is left where it is.
    fn poll(&mut self, state: MotionState) -> Result<Option<MotionEvent>, DriverFault>;

    /// Whether `attribute` may change while in `state`.
    ///
    /// The default allows every change at any time.
    fn can_modify(&self, attribute: Attribute, state: MotionState) -> bool {
        let _ = (attribute, state);
        true
    }
}
