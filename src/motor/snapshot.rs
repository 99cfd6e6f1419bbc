//! Read-side views of a device.

use core::fmt;

use heapless::String;

use crate::mode::{MotionState, MotorType};

use super::settings::MotorSettings;

/// Value of one readable attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Decimal integer.
    Int(i32),
    /// Registry name of an enum field.
    Name(&'static str),
    /// Port name, verbatim.
    Port(String<32>),
    /// List of registry names.
    Names(&'static [&'static str]),
}

impl AttributeValue {
    /// Integer payload, if this is a numeric value.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Name(name) => f.write_str(name),
            AttributeValue::Port(port) => f.write_str(port),
            AttributeValue::Names(names) => {
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str(name)?;
                }
                Ok(())
            }
        }
    }
}

/// Every readable field of a device, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorSnapshot {
    /// Port the device is attached to.
    pub port_name: String<32>,
    /// Device ordinal.
    pub ordinal: u32,
    /// Motion state.
    pub state: MotionState,
    /// Measured position.
    pub position: i32,
    /// Applied duty cycle.
    pub duty_cycle: i32,
    /// Measured speed.
    pub pulses_per_second: i32,
    /// Run flag.
    pub run: bool,
    /// Emergency stop latch.
    pub estop: bool,
    /// Modes, setpoints and gains.
    pub settings: MotorSettings,
}

impl MotorSnapshot {
    /// Motor type at capture time.
    #[inline]
    pub fn motor_type(&self) -> MotorType {
        self.settings.motor_type
    }
}
