//! Motor configuration from TOML.

use serde::Deserialize;

use crate::mode::{
    EncoderMode, MotorType, PolarityMode, PositionMode, RegulationMode, RunMode, StopMode,
};
use crate::motor::{MotorSettings, PidGains};

/// Per-port motor defaults from TOML.
///
/// Every field is optional; missing fields take the power-on default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotorConfig {
    /// Motor type.
    #[serde(default, rename = "type")]
    pub motor_type: MotorType,

    /// Run mode.
    #[serde(default)]
    pub run_mode: RunMode,

    /// Regulation mode.
    #[serde(default)]
    pub regulation_mode: RegulationMode,

    /// Stop mode.
    #[serde(default)]
    pub stop_mode: StopMode,

    /// Position mode.
    #[serde(default)]
    pub position_mode: PositionMode,

    /// Polarity mode.
    #[serde(default)]
    pub polarity_mode: PolarityMode,

    /// Encoder mode.
    #[serde(default)]
    pub encoder_mode: EncoderMode,

    /// Duty-cycle setpoint, percent.
    #[serde(default)]
    pub duty_cycle_sp: i32,

    /// Speed setpoint, pulses per second.
    #[serde(default)]
    pub pulses_per_second_sp: i32,

    /// Run duration in milliseconds.
    #[serde(default)]
    pub time_sp: i32,

    /// Position setpoint in encoder pulses.
    #[serde(default)]
    pub position_sp: i32,

    /// Ramp-up duration in milliseconds.
    #[serde(default)]
    pub ramp_up_sp: i32,

    /// Ramp-down duration in milliseconds.
    #[serde(default)]
    pub ramp_down_sp: i32,

    /// Speed regulation gains.
    #[serde(default)]
    pub speed_regulation: PidGains,
}

impl MotorConfig {
    /// Settings this section describes.
    pub fn settings(&self) -> MotorSettings {
        MotorSettings {
            motor_type: self.motor_type,
            run_mode: self.run_mode,
            regulation_mode: self.regulation_mode,
            stop_mode: self.stop_mode,
            position_mode: self.position_mode,
            polarity_mode: self.polarity_mode,
            encoder_mode: self.encoder_mode,
            duty_cycle_sp: self.duty_cycle_sp,
            pulses_per_second_sp: self.pulses_per_second_sp,
            time_sp: self.time_sp,
            position_sp: self.position_sp,
            ramp_up_sp: self.ramp_up_sp,
            ramp_down_sp: self.ramp_down_sp,
            pid: self.speed_regulation,
        }
    }
}
