//! Attribute catalogue.

use core::fmt;

use crate::mode::ModeFamily;
use crate::motor::PidGain;

/// Every named endpoint a tacho motor exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Attribute {
    /// Port the motor is attached to.
    PortName,
    /// Motor type.
    Type,
    /// Measured position (writable: reseeds the count).
    Position,
    /// Motion state.
    State,
    /// Measured duty cycle.
    DutyCycle,
    /// Measured speed in encoder pulses per second.
    PulsesPerSecond,
    /// Duty-cycle setpoint.
    DutyCycleSp,
    /// Speed setpoint.
    PulsesPerSecondSp,
    /// Run duration setpoint.
    TimeSp,
    /// Position setpoint.
    PositionSp,
    /// Run mode.
    RunMode,
    /// Regulation mode.
    RegulationMode,
    /// List of legal stop modes.
    StopModes,
    /// Stop mode.
    StopMode,
    /// Position mode.
    PositionMode,
    /// Polarity mode.
    PolarityMode,
    /// Encoder mode.
    EncoderMode,
    /// Ramp-up duration.
    RampUpSp,
    /// Ramp-down duration.
    RampDownSp,
    /// Proportional gain.
    SpeedRegulationP,
    /// Integral gain.
    SpeedRegulationI,
    /// Derivative gain.
    SpeedRegulationD,
    /// Feed-forward gain.
    SpeedRegulationK,
    /// Run flag.
    Run,
    /// Emergency stop flag.
    Estop,
    /// One-shot reset command.
    Reset,
}

impl Attribute {
    /// Every attribute, in endpoint order.
    pub const ALL: [Attribute; 26] = [
        Attribute::PortName,
        Attribute::Type,
        Attribute::Position,
        Attribute::State,
        Attribute::DutyCycle,
        Attribute::PulsesPerSecond,
        Attribute::DutyCycleSp,
        Attribute::PulsesPerSecondSp,
        Attribute::TimeSp,
        Attribute::PositionSp,
        Attribute::RunMode,
        Attribute::RegulationMode,
        Attribute::StopModes,
        Attribute::StopMode,
        Attribute::PositionMode,
        Attribute::PolarityMode,
        Attribute::EncoderMode,
        Attribute::RampUpSp,
        Attribute::RampDownSp,
        Attribute::SpeedRegulationP,
        Attribute::SpeedRegulationI,
        Attribute::SpeedRegulationD,
        Attribute::SpeedRegulationK,
        Attribute::Run,
        Attribute::Estop,
        Attribute::Reset,
    ];

    /// Endpoint name.
    pub const fn name(self) -> &'static str {
        match self {
            Attribute::PortName => "port_name",
            Attribute::Type => "type",
            Attribute::Position => "position",
            Attribute::State => "state",
            Attribute::DutyCycle => "duty_cycle",
            Attribute::PulsesPerSecond => "pulses_per_second",
            Attribute::DutyCycleSp => "duty_cycle_sp",
            Attribute::PulsesPerSecondSp => "pulses_per_second_sp",
            Attribute::TimeSp => "time_sp",
            Attribute::PositionSp => "position_sp",
            Attribute::RunMode => "run_mode",
            Attribute::RegulationMode => "regulation_mode",
            Attribute::StopModes => "stop_modes",
            Attribute::StopMode => "stop_mode",
            Attribute::PositionMode => "position_mode",
            Attribute::PolarityMode => "polarity_mode",
            Attribute::EncoderMode => "encoder_mode",
            Attribute::RampUpSp => "ramp_up_sp",
            Attribute::RampDownSp => "ramp_down_sp",
            Attribute::SpeedRegulationP => "speed_regulation_P",
            Attribute::SpeedRegulationI => "speed_regulation_I",
            Attribute::SpeedRegulationD => "speed_regulation_D",
            Attribute::SpeedRegulationK => "speed_regulation_K",
            Attribute::Run => "run",
            Attribute::Estop => "estop",
            Attribute::Reset => "reset",
        }
    }

    /// Look an attribute up by its exact endpoint name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.name() == name)
    }

    /// `false` only for the write-only `reset` command.
    #[inline]
    pub const fn is_readable(self) -> bool {
        !matches!(self, Attribute::Reset)
    }

    /// `true` for attributes that accept writes.
    pub const fn is_writable(self) -> bool {
        !matches!(
            self,
            Attribute::PortName
                | Attribute::State
                | Attribute::DutyCycle
                | Attribute::PulsesPerSecond
                | Attribute::StopModes
        )
    }

    /// Mode family backing an enum-valued attribute.
    pub const fn family(self) -> Option<ModeFamily> {
        match self {
            Attribute::Type => Some(ModeFamily::MotorType),
            Attribute::State => Some(ModeFamily::MotionState),
            Attribute::RunMode => Some(ModeFamily::Run),
            Attribute::RegulationMode => Some(ModeFamily::Regulation),
            Attribute::StopModes | Attribute::StopMode => Some(ModeFamily::Stop),
            Attribute::PositionMode => Some(ModeFamily::Position),
            Attribute::PolarityMode => Some(ModeFamily::Polarity),
            Attribute::EncoderMode => Some(ModeFamily::Encoder),
            _ => None,
        }
    }

    /// Accepted integer range of a numeric writable attribute.
    ///
    /// `estop` has none: any integer is a request, non-zero engages.
    pub const fn bounds(self) -> Option<(i64, i64)> {
        const I32_MIN: i64 = i32::MIN as i64;
        const I32_MAX: i64 = i32::MAX as i64;
        match self {
            Attribute::Position | Attribute::PositionSp => Some((I32_MIN, I32_MAX)),
            Attribute::RampUpSp | Attribute::RampDownSp => Some((0, super::MAX_RAMP_SP as i64)),
            Attribute::DutyCycleSp => Some((
                -(super::MAX_DUTY_CYCLE_SP as i64),
                super::MAX_DUTY_CYCLE_SP as i64,
            )),
            Attribute::PulsesPerSecondSp => Some((
                -(super::MAX_PULSES_PER_SECOND_SP as i64),
                super::MAX_PULSES_PER_SECOND_SP as i64,
            )),
            Attribute::TimeSp
            | Attribute::SpeedRegulationP
            | Attribute::SpeedRegulationI
            | Attribute::SpeedRegulationD
            | Attribute::SpeedRegulationK => Some((0, I32_MAX)),
            Attribute::Run => Some((0, 1)),
            Attribute::Reset => Some((1, 1)),
            _ => None,
        }
    }

    /// PID gain addressed by a `speed_regulation_*` attribute.
    pub const fn pid_gain(self) -> Option<PidGain> {
        match self {
            Attribute::SpeedRegulationP => Some(PidGain::P),
            Attribute::SpeedRegulationI => Some(PidGain::I),
            Attribute::SpeedRegulationD => Some(PidGain::D),
            Attribute::SpeedRegulationK => Some(PidGain::K),
            _ => None,
        }
    }
}

impl From<PidGain> for Attribute {
    fn from(gain: PidGain) -> Self {
        match gain {
            PidGain::P => Attribute::SpeedRegulationP,
            PidGain::I => Attribute::SpeedRegulationI,
            PidGain::D => Attribute::SpeedRegulationD,
            PidGain::K => Attribute::SpeedRegulationK,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique_and_resolvable() {
        for attribute in Attribute::ALL {
            assert_eq!(Attribute::from_name(attribute.name()), Some(attribute));
        }
        assert_eq!(Attribute::from_name("speed_regulation_p"), None);
    }

    #[test]
    fn test_access() {
        assert!(!Attribute::Reset.is_readable());
        assert!(Attribute::Reset.is_writable());
        assert!(!Attribute::State.is_writable());
        assert!(Attribute::Position.is_writable());
    }

    #[test]
    fn test_bounds() {
        assert_eq!(Attribute::DutyCycleSp.bounds(), Some((-100, 100)));
        assert_eq!(Attribute::RampUpSp.bounds(), Some((0, 10_000)));
        assert_eq!(Attribute::PulsesPerSecondSp.bounds(), Some((-2000, 2000)));
        assert_eq!(Attribute::StopMode.bounds(), None);
    }
}
