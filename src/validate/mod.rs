//! Parameter validation.
//!
//! Every settable quantity is checked here before it reaches a driver. A
//! validation either yields a fully typed [`Write`] or a
//! [`ValidationError`]; nothing is ever applied partially or clamped.

mod attribute;
mod parse;

pub use attribute::Attribute;
pub use parse::parse_leading_int;

use crate::error::{Reason, ValidationError};
use crate::mode::{
    EncoderMode, ModeName, MotorType, PolarityMode, PositionMode, RegulationMode, RunMode,
    StopMode,
};
use crate::motor::PidGain;

/// Longest accepted ramp duration, in milliseconds.
pub const MAX_RAMP_SP: i32 = 10_000;

/// Largest accepted duty-cycle setpoint magnitude, in percent.
pub const MAX_DUTY_CYCLE_SP: i32 = 100;

/// Largest accepted speed setpoint magnitude, in pulses per second.
pub const MAX_PULSES_PER_SECOND_SP: i32 = 2000;

/// Value that must be written to `reset`.
pub const RESET_COMMAND: i64 = 1;

/// A validated, typed attribute write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    /// Motor type.
    Type(MotorType),
    /// Position override.
    Position(i32),
    /// Duty-cycle setpoint.
    DutyCycleSp(i32),
    /// Speed setpoint.
    PulsesPerSecondSp(i32),
    /// Run duration setpoint.
    TimeSp(i32),
    /// Position setpoint.
    PositionSp(i32),
    /// Run mode.
    RunMode(RunMode),
    /// Regulation mode.
    RegulationMode(RegulationMode),
    /// Stop mode.
    StopMode(StopMode),
    /// Position mode.
    PositionMode(PositionMode),
    /// Polarity mode.
    PolarityMode(PolarityMode),
    /// Encoder mode.
    EncoderMode(EncoderMode),
    /// Ramp-up duration.
    RampUpSp(i32),
    /// Ramp-down duration.
    RampDownSp(i32),
    /// One PID gain.
    SpeedRegulation(PidGain, i32),
    /// Run flag.
    Run(bool),
    /// Emergency stop flag.
    Estop(bool),
    /// Reset command.
    Reset,
}

impl Write {
    /// Attribute this write targets.
    pub fn attribute(&self) -> Attribute {
        match self {
            Write::Type(_) => Attribute::Type,
            Write::Position(_) => Attribute::Position,
            Write::DutyCycleSp(_) => Attribute::DutyCycleSp,
            Write::PulsesPerSecondSp(_) => Attribute::PulsesPerSecondSp,
            Write::TimeSp(_) => Attribute::TimeSp,
            Write::PositionSp(_) => Attribute::PositionSp,
            Write::RunMode(_) => Attribute::RunMode,
            Write::RegulationMode(_) => Attribute::RegulationMode,
            Write::StopMode(_) => Attribute::StopMode,
            Write::PositionMode(_) => Attribute::PositionMode,
            Write::PolarityMode(_) => Attribute::PolarityMode,
            Write::EncoderMode(_) => Attribute::EncoderMode,
            Write::RampUpSp(_) => Attribute::RampUpSp,
            Write::RampDownSp(_) => Attribute::RampDownSp,
            Write::SpeedRegulation(gain, _) => Attribute::from(*gain),
            Write::Run(_) => Attribute::Run,
            Write::Estop(_) => Attribute::Estop,
            Write::Reset => Attribute::Reset,
        }
    }
}

/// Check an integer against the domain of `attribute`.
///
/// Attributes without a numeric domain are reported as read-only when they
/// cannot be written and as a parse failure otherwise.
pub fn check_value(attribute: Attribute, value: i64) -> Result<i32, ValidationError> {
    if !attribute.is_writable() {
        return Err(ValidationError::new(attribute, Reason::ReadOnly));
    }
    let (min, max) = attribute
        .bounds()
        .ok_or(ValidationError::new(attribute, Reason::Parse))?;
    if value < min || value > max {
        return Err(ValidationError::new(attribute, Reason::Range { value, min, max }));
    }
    // Every bound lies inside i32
    Ok(value as i32)
}

/// Parse and range-check a numeric attribute.
pub fn parse_value(attribute: Attribute, input: &str) -> Result<i32, ValidationError> {
    let value =
        parse_leading_int(input).ok_or(ValidationError::new(attribute, Reason::Parse))?;
    check_value(attribute, value)
}

/// Resolve a mode name for an enum-valued attribute.
pub fn parse_mode<M: ModeName>(attribute: Attribute, input: &str) -> Result<M, ValidationError> {
    M::from_name(input).map_err(|_| ValidationError::new(attribute, Reason::InvalidMode))
}

/// Validate textual input for `attribute`.
///
/// # Errors
///
/// - `ReadOnly` for attributes that cannot be written
/// - `Parse` when no leading integer is present
/// - `Range` when the value is outside the attribute's domain
/// - `InvalidMode` when a name is not registered in the attribute's family
pub fn validate(attribute: Attribute, input: &str) -> Result<Write, ValidationError> {
    if !attribute.is_writable() {
        return Err(ValidationError::new(attribute, Reason::ReadOnly));
    }

    let write = match attribute {
        Attribute::Type => Write::Type(parse_mode(attribute, input)?),
        Attribute::RunMode => Write::RunMode(parse_mode(attribute, input)?),
        Attribute::RegulationMode => Write::RegulationMode(parse_mode(attribute, input)?),
        Attribute::StopMode => Write::StopMode(parse_mode(attribute, input)?),
        Attribute::PositionMode => Write::PositionMode(parse_mode(attribute, input)?),
        Attribute::PolarityMode => Write::PolarityMode(parse_mode(attribute, input)?),
        Attribute::EncoderMode => Write::EncoderMode(parse_mode(attribute, input)?),
        Attribute::Position => Write::Position(parse_value(attribute, input)?),
        Attribute::PositionSp => Write::PositionSp(parse_value(attribute, input)?),
        Attribute::DutyCycleSp => Write::DutyCycleSp(parse_value(attribute, input)?),
        Attribute::PulsesPerSecondSp => Write::PulsesPerSecondSp(parse_value(attribute, input)?),
        Attribute::TimeSp => Write::TimeSp(parse_value(attribute, input)?),
        Attribute::RampUpSp => Write::RampUpSp(parse_value(attribute, input)?),
        Attribute::RampDownSp => Write::RampDownSp(parse_value(attribute, input)?),
        Attribute::SpeedRegulationP
        | Attribute::SpeedRegulationI
        | Attribute::SpeedRegulationD
        | Attribute::SpeedRegulationK => {
            let value = parse_value(attribute, input)?;
            match attribute.pid_gain() {
                Some(gain) => Write::SpeedRegulation(gain, value),
                None => return Err(ValidationError::new(attribute, Reason::ReadOnly)),
            }
        }
        Attribute::Run => Write::Run(parse_value(attribute, input)? == 1),
        Attribute::Estop => {
            let value =
                parse_leading_int(input).ok_or(ValidationError::new(attribute, Reason::Parse))?;
            Write::Estop(value != 0)
        }
        Attribute::Reset => {
            parse_value(attribute, input)?;
            Write::Reset
        }
        Attribute::PortName
        | Attribute::State
        | Attribute::DutyCycle
        | Attribute::PulsesPerSecond
        | Attribute::StopModes => {
            return Err(ValidationError::new(attribute, Reason::ReadOnly));
        }
    };

    Ok(write)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(attribute: Attribute, input: &str) -> Reason {
        validate(attribute, input).unwrap_err().reason
    }

    #[test]
    fn test_duty_cycle_bounds() {
        assert_eq!(validate(Attribute::DutyCycleSp, "50"), Ok(Write::DutyCycleSp(50)));
        assert_eq!(validate(Attribute::DutyCycleSp, "-100"), Ok(Write::DutyCycleSp(-100)));
        assert_eq!(
            reason(Attribute::DutyCycleSp, "150"),
            Reason::Range { value: 150, min: -100, max: 100 }
        );
        assert_eq!(reason(Attribute::DutyCycleSp, "fast"), Reason::Parse);
    }

    #[test]
    fn test_ramp_bounds() {
        assert_eq!(validate(Attribute::RampUpSp, "10000"), Ok(Write::RampUpSp(10_000)));
        assert!(matches!(reason(Attribute::RampDownSp, "10001"), Reason::Range { .. }));
        assert!(matches!(reason(Attribute::RampDownSp, "-1"), Reason::Range { .. }));
    }

    #[test]
    fn test_run_flag() {
        assert_eq!(validate(Attribute::Run, "1"), Ok(Write::Run(true)));
        assert_eq!(validate(Attribute::Run, "0\n"), Ok(Write::Run(false)));
        assert!(matches!(reason(Attribute::Run, "2"), Reason::Range { .. }));
    }

    #[test]
    fn test_estop_accepts_any_integer() {
        assert_eq!(validate(Attribute::Estop, "7"), Ok(Write::Estop(true)));
        assert_eq!(validate(Attribute::Estop, "0"), Ok(Write::Estop(false)));
        assert_eq!(reason(Attribute::Estop, "yes"), Reason::Parse);
        // Any parsed integer is an estop request
        assert_eq!(validate(Attribute::Estop, "4294967296"), Ok(Write::Estop(true)));
        assert_eq!(validate(Attribute::Estop, "-1"), Ok(Write::Estop(true)));
        assert_eq!(validate(Attribute::Estop, "0x0"), Ok(Write::Estop(false)));
    }

    #[test]
    fn test_reset_sentinel() {
        assert_eq!(validate(Attribute::Reset, "1"), Ok(Write::Reset));
        assert!(matches!(reason(Attribute::Reset, "0"), Reason::Range { .. }));
        assert!(matches!(reason(Attribute::Reset, "2"), Reason::Range { .. }));
    }

    #[test]
    fn test_modes() {
        assert_eq!(
            validate(Attribute::StopMode, "Brake"),
            Ok(Write::StopMode(StopMode::Brake))
        );
        assert_eq!(reason(Attribute::StopMode, "bounce"), Reason::InvalidMode);
        assert_eq!(
            validate(Attribute::Type, "minitacho"),
            Ok(Write::Type(MotorType::MiniTacho))
        );
    }

    #[test]
    fn test_pid_gains() {
        assert_eq!(
            validate(Attribute::SpeedRegulationI, "0x10"),
            Ok(Write::SpeedRegulation(PidGain::I, 16))
        );
        assert!(matches!(reason(Attribute::SpeedRegulationK, "-1"), Reason::Range { .. }));
    }

    #[test]
    fn test_position_domain() {
        assert_eq!(validate(Attribute::Position, "-12345"), Ok(Write::Position(-12345)));
        assert!(matches!(reason(Attribute::PositionSp, "4294967296"), Reason::Range { .. }));
    }

    #[test]
    fn test_read_only() {
        for attribute in [
            Attribute::PortName,
            Attribute::State,
            Attribute::DutyCycle,
            Attribute::PulsesPerSecond,
            Attribute::StopModes,
        ] {
            assert_eq!(reason(attribute, "1"), Reason::ReadOnly);
        }
    }

    #[test]
    fn test_write_targets_its_attribute() {
        for attribute in Attribute::ALL.into_iter().filter(|a| a.is_writable()) {
            let input = match attribute.family() {
                Some(family) => family.names()[0],
                None => "1",
            };
            let write = validate(attribute, input).unwrap();
            assert_eq!(write.attribute(), attribute);
        }
    }
}
