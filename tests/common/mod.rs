//! Shared test driver.

#![allow(dead_code)]

use std::collections::VecDeque;

use tacho_motor::error::DriverFault;
use tacho_motor::mode::{
    EncoderMode, MotionState, MotorType, PolarityMode, PositionMode, RegulationMode, RunMode,
    StopMode,
};
use tacho_motor::motor::{MotionEvent, MotorSettings, PidGain, TachoMotorDriver};
use tacho_motor::Attribute;

/// In-memory driver that reports scripted events.
///
/// Without a script it walks every ramp forward one event per poll, the
/// way a real control loop eventually would.
#[derive(Debug, Default)]
pub struct SimDriver {
    pub settings: MotorSettings,
    pub position: i32,
    pub duty_cycle: i32,
    pub pulses_per_second: i32,
    pub script: VecDeque<Option<MotionEvent>>,
    pub entered: Vec<MotionState>,
    pub estop_calls: Vec<bool>,
    pub resets: usize,
    pub fault: Option<DriverFault>,
    pub locked: Vec<Attribute>,
}

impl SimDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes refused while a profile is active.
    pub fn locking(attributes: &[Attribute]) -> Self {
        Self {
            locked: attributes.to_vec(),
            ..Self::default()
        }
    }

    fn natural_event(state: MotionState, run_mode: RunMode) -> Option<MotionEvent> {
        match state {
            MotionState::SetupRampTime
            | MotionState::SetupRampPosition
            | MotionState::SetupRampRegulation => Some(MotionEvent::SetupComplete),
            MotionState::RampUp => Some(MotionEvent::RampUpComplete),
            MotionState::RampConst if run_mode != RunMode::Forever => {
                Some(MotionEvent::RampDownTriggered)
            }
            MotionState::RampDown => Some(MotionEvent::RampDownComplete),
            MotionState::PositionRampDown => Some(MotionEvent::TargetReached),
            MotionState::Stop => Some(MotionEvent::StopApplied),
            _ => None,
        }
    }
}

impl TachoMotorDriver for SimDriver {
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
        self.resets += 1;
        self.position = 0;
        self.settings.clear_setpoints();
    }

    fn emergency_stop(&mut self, engaged: bool) {
        self.estop_calls.push(engaged);
    }

    fn enter_state(&mut self, state: MotionState) {
        self.entered.push(state);
        self.duty_cycle = match state {
            MotionState::RunForever | MotionState::RampConst => self.settings.duty_cycle_sp,
            MotionState::Stop | MotionState::Idle => 0,
            _ => self.duty_cycle,
        };
    }

    fn poll(&mut self, state: MotionState) -> Result<Option<MotionEvent>, DriverFault> {
        if let Some(fault) = self.fault.take() {
            return Err(fault);
        }
        match self.script.pop_front() {
            Some(event) => Ok(event),
            None => Ok(Self::natural_event(state, self.settings.run_mode)),
        }
    }

    fn can_modify(&self, attribute: Attribute, state: MotionState) -> bool {
        !(state.is_active() && self.locked.contains(&attribute))
    }
}

/// Poll until the device is idle again, collecting every state passed.
pub fn run_to_idle<D: TachoMotorDriver>(
    device: &mut tacho_motor::MotorDevice<D>,
    limit: usize,
) -> Vec<MotionState> {
    let mut seen = Vec::new();
    for _ in 0..limit {
        if let Some(state) = device.poll().expect("poll failed") {
            seen.push(state);
            if state == MotionState::Idle {
                break;
            }
        }
    }
    seen
}
