//! Stored motor settings.
//!
//! Plain data shared by drivers: mode selections, setpoints and PID gains.

use core::fmt;

use serde::Deserialize;

use crate::mode::{
    EncoderMode, MotorType, PolarityMode, PositionMode, RegulationMode, RunMode, StopMode,
};

/// One of the four speed-regulation gains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PidGain {
    /// Proportional.
    P,
    /// Integral.
    I,
    /// Derivative.
    D,
    /// Feed-forward.
    K,
}

impl PidGain {
    /// All gains.
    pub const ALL: [PidGain; 4] = [PidGain::P, PidGain::I, PidGain::D, PidGain::K];
}

impl fmt::Display for PidGain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PidGain::P => "P",
            PidGain::I => "I",
            PidGain::D => "D",
            PidGain::K => "K",
        };
        f.write_str(s)
    }
}

/// Speed regulation gains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    #[serde(default)]
    pub p: i32,
    /// Integral gain.
    #[serde(default)]
    pub i: i32,
    /// Derivative gain.
    #[serde(default)]
    pub d: i32,
    /// Feed-forward gain.
    #[serde(default)]
    pub k: i32,
}

impl PidGains {
    /// Create a gain set.
    pub const fn new(p: i32, i: i32, d: i32, k: i32) -> Self {
        Self { p, i, d, k }
    }

    /// Read one gain.
    #[inline]
    pub fn get(&self, gain: PidGain) -> i32 {
        match gain {
            PidGain::P => self.p,
            PidGain::I => self.i,
            PidGain::D => self.d,
            PidGain::K => self.k,
        }
    }

    /// Write one gain.
    #[inline]
    pub fn set(&mut self, gain: PidGain, value: i32) {
        match gain {
            PidGain::P => self.p = value,
            PidGain::I => self.i = value,
            PidGain::D => self.d = value,
            PidGain::K => self.k = value,
        }
    }
}

/// Mode selections, setpoints and gains of one motor.
///
/// Values are assumed to be validated already.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorSettings {
    /// Motor type.
    pub motor_type: MotorType,
    /// Run mode.
    pub run_mode: RunMode,
    /// Regulation mode.
    pub regulation_mode: RegulationMode,
    /// Stop mode.
    pub stop_mode: StopMode,
    /// Position mode.
    pub position_mode: PositionMode,
    /// Polarity mode.
    pub polarity_mode: PolarityMode,
    /// Encoder mode.
    pub encoder_mode: EncoderMode,
    /// Duty-cycle setpoint, percent.
    pub duty_cycle_sp: i32,
    /// Speed setpoint, pulses per second.
    pub pulses_per_second_sp: i32,
    /// Run duration, milliseconds.
    pub time_sp: i32,
    /// Position setpoint, encoder pulses.
    pub position_sp: i32,
    /// Ramp-up duration, milliseconds.
    pub ramp_up_sp: i32,
    /// Ramp-down duration, milliseconds.
    pub ramp_down_sp: i32,
    /// Speed regulation gains.
    pub pid: PidGains,
}

impl MotorSettings {
    /// Zero the six setpoints and the speed regulation gains. Modes are kept.
    pub fn clear_setpoints(&mut self) {
        self.duty_cycle_sp = 0;
        self.pulses_per_second_sp = 0;
        self.time_sp = 0;
        self.position_sp = 0;
        self.ramp_up_sp = 0;
        self.ramp_down_sp = 0;
        self.pid = PidGains::default();
    }
}
