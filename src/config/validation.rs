//! Configuration validation.

use crate::error::{ConfigError, Error, Result, ValidationError};
use crate::motor::PidGain;
use crate::validate::{check_value, Attribute};

use super::{MotorConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks every configured setpoint and gain against the same domains as
/// attribute writes, so a configuration can never seed a value a write
/// would reject. Mode names are already checked by deserialization.
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (port, motor) in config.motors.iter() {
        if port.is_empty() {
            return Err(Error::Config(ConfigError::InvalidPortName));
        }
        validate_motor(motor).map_err(|error| {
            Error::Config(ConfigError::InvalidSetting {
                port: port.clone(),
                error,
            })
        })?;
    }

    Ok(())
}

fn validate_motor(config: &MotorConfig) -> core::result::Result<(), ValidationError> {
    let setpoints = [
        (Attribute::DutyCycleSp, config.duty_cycle_sp),
        (Attribute::PulsesPerSecondSp, config.pulses_per_second_sp),
        (Attribute::TimeSp, config.time_sp),
        (Attribute::PositionSp, config.position_sp),
        (Attribute::RampUpSp, config.ramp_up_sp),
        (Attribute::RampDownSp, config.ramp_down_sp),
    ];
    for (attribute, value) in setpoints {
        check_value(attribute, value.into())?;
    }

    for gain in PidGain::ALL {
        check_value(Attribute::from(gain), config.speed_regulation.get(gain).into())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reason;

    #[test]
    fn test_duty_cycle_out_of_range() {
        let config = MotorConfig {
            duty_cycle_sp: 150,
            ..Default::default()
        };

        let err = validate_motor(&config).unwrap_err();
        assert_eq!(err.attribute, Attribute::DutyCycleSp);
        assert!(matches!(err.reason, Reason::Range { value: 150, .. }));
    }

    #[test]
    fn test_negative_gain_rejected() {
        let mut config = MotorConfig::default();
        config.speed_regulation.i = -5;

        let err = validate_motor(&config).unwrap_err();
        assert_eq!(err.attribute, Attribute::SpeedRegulationI);
    }

    #[test]
    fn test_error_names_port() {
        let mut config = SystemConfig::default();
        let port = heapless::String::try_from("outC").unwrap();
        let motor = MotorConfig {
            ramp_up_sp: 20_000,
            ..Default::default()
        };
        config.motors.insert(port, motor).unwrap();

        match validate_config(&config) {
            Err(Error::Config(ConfigError::InvalidSetting { port, error })) => {
                assert_eq!(port.as_str(), "outC");
                assert_eq!(error.attribute, Attribute::RampUpSp);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
