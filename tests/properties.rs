//! Property tests: registry round-trips, range acceptance and rejection
//! without side effects.

mod common;

use proptest::prelude::*;

use common::SimDriver;
use tacho_motor::mode::{name_of, ordinal_of, ModeFamily};
use tacho_motor::{validate, Attribute, MotorDevice, MotorSnapshot};

fn family() -> impl Strategy<Value = ModeFamily> {
    prop::sample::select(ModeFamily::ALL.to_vec())
}

fn numeric_attribute() -> impl Strategy<Value = Attribute> {
    prop::sample::select(vec![
        Attribute::DutyCycleSp,
        Attribute::PulsesPerSecondSp,
        Attribute::TimeSp,
        Attribute::PositionSp,
        Attribute::RampUpSp,
        Attribute::RampDownSp,
        Attribute::SpeedRegulationP,
        Attribute::SpeedRegulationI,
        Attribute::SpeedRegulationD,
        Attribute::SpeedRegulationK,
    ])
}

/// Flip the case of every other ASCII letter.
fn mixed_case(name: &str) -> String {
    name.chars()
        .enumerate()
        .map(|(i, c)| if i % 2 == 0 { c.to_ascii_uppercase() } else { c })
        .collect()
}

fn snapshot(device: &MotorDevice<SimDriver>) -> MotorSnapshot {
    device.snapshot()
}

proptest! {
    #[test]
    fn registry_round_trip(family in family(), index in 0usize..16) {
        let index = index % family.len();
        let name = name_of(family, index).unwrap();
        prop_assert_eq!(ordinal_of(family, name), Ok(index));
        prop_assert_eq!(ordinal_of(family, &mixed_case(name)), Ok(index));
        prop_assert_eq!(ordinal_of(family, &name.to_ascii_uppercase()), Ok(index));
    }

    #[test]
    fn accepted_iff_in_bounds(
        attribute in numeric_attribute(),
        value in -5_000_000_000i64..5_000_000_000i64,
    ) {
        let (min, max) = attribute.bounds().unwrap();
        let accepted = validate(attribute, &value.to_string()).is_ok();
        prop_assert_eq!(accepted, min <= value && value <= max);
    }

    #[test]
    fn rejected_write_changes_nothing(attribute in numeric_attribute(), value in any::<i64>()) {
        let mut device = MotorDevice::new("outA", 3, SimDriver::new()).unwrap();
        device.write(Attribute::DutyCycleSp, "12").unwrap();
        device.write(Attribute::Run, "1").unwrap();
        let before = snapshot(&device);

        let (min, max) = attribute.bounds().unwrap();
        prop_assume!(value < min || value > max);
        prop_assert!(device.write(attribute, &value.to_string()).is_err());
        prop_assert_eq!(snapshot(&device), before);
    }

    #[test]
    fn unparseable_input_is_rejected(attribute in numeric_attribute(), text in "[a-zA-Z_ ]{0,12}") {
        let mut device = MotorDevice::new("outA", 0, SimDriver::new()).unwrap();
        let before = snapshot(&device);
        prop_assert!(device.write(attribute, &text).is_err());
        prop_assert_eq!(snapshot(&device), before);
    }
}
