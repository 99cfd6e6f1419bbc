//! Error types for tacho-motor.
//!
//! Validation, state-machine, driver and configuration failures share one
//! error type so callers can propagate with `?` and still tell the kinds
//! apart through [`Error::kind`].

use core::fmt;

use crate::mode::{MotionState, UnknownMode};
use crate::motor::MotionEvent;
use crate::validate::Attribute;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all tacho-motor operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input rejected before any state was touched.
    Validation(ValidationError),
    /// Registry name lookup failed.
    Mode(UnknownMode),
    /// Request not legal in the current motion state.
    Transition(TransitionError),
    /// Fault reported by the concrete driver, passed through unchanged.
    Driver(DriverFault),
    /// Configuration parsing or validation error.
    Config(ConfigError),
    /// No room left for another state observer.
    ObserverLimit,
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Input could not be interpreted as the expected type.
    Parse,
    /// Parsed value outside the declared domain.
    Range,
    /// Name not found in the relevant mode family.
    InvalidMode,
    /// Write to an attribute that cannot be written.
    ReadOnly,
    /// Request refused by the motion state machine.
    IllegalTransition,
    /// Opaque driver failure.
    DriverFault,
    /// Configuration problem.
    Config,
    /// Fixed-capacity table is full.
    Capacity,
}

/// A rejected attribute write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    /// Attribute the input was meant for.
    pub attribute: Attribute,
    /// Why it was rejected.
    pub reason: Reason,
}

/// Rejection reason carried by [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// No digits could be consumed.
    Parse,
    /// Value outside `[min, max]`.
    Range {
        /// Parsed value
        value: i64,
        /// Lowest accepted value
        min: i64,
        /// Highest accepted value
        max: i64,
    },
    /// Name not registered in the attribute's mode family.
    InvalidMode,
    /// Attribute is read-only.
    ReadOnly,
}

/// Motion state machine refusals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// Event has no edge out of the current state.
    Illegal {
        /// State the machine was in
        from: MotionState,
        /// Event that was rejected
        event: MotionEvent,
    },
    /// Reset requested outside `Idle`.
    ResetWhileActive {
        /// State the machine was in
        state: MotionState,
    },
    /// Run requested while the emergency stop is engaged.
    EstopEngaged,
    /// Run requested while the previous run is still stopping.
    Stopping,
    /// The driver refuses to change this attribute in the current state.
    Locked {
        /// Attribute that was locked
        attribute: Attribute,
        /// State the machine was in
        state: MotionState,
    },
}

/// Driver-internal failure.
///
/// The core never interprets these; they are reported upward as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverFault {
    /// A bridge input pin could not be driven.
    Pin,
    /// The PWM channel rejected a duty cycle.
    Pwm,
    /// Encoder feedback is inconsistent.
    Encoder,
    /// Driver-specific fault description.
    Other(heapless::String<32>),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Port name not found in configuration
    MotorNotFound(heapless::String<32>),
    /// Port name is empty or longer than 32 bytes
    InvalidPortName,
    /// Port already has a registered device
    DuplicatePort(heapless::String<32>),
    /// Device table is full
    TooManyMotors,
    /// A configured default fails validation
    InvalidSetting {
        /// Port whose section holds the value
        port: heapless::String<32>,
        /// Underlying rejection
        error: ValidationError,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(e) => e.kind(),
            Error::Mode(_) => ErrorKind::InvalidMode,
            Error::Transition(_) => ErrorKind::IllegalTransition,
            Error::Driver(_) => ErrorKind::DriverFault,
            Error::Config(_) => ErrorKind::Config,
            Error::ObserverLimit => ErrorKind::Capacity,
        }
    }
}

impl ValidationError {
    /// Create a validation error.
    #[inline]
    pub const fn new(attribute: Attribute, reason: Reason) -> Self {
        Self { attribute, reason }
    }

    /// Classify this rejection.
    pub fn kind(&self) -> ErrorKind {
        match self.reason {
            Reason::Parse => ErrorKind::Parse,
            Reason::Range { .. } => ErrorKind::Range,
            Reason::InvalidMode => ErrorKind::InvalidMode,
            Reason::ReadOnly => ErrorKind::ReadOnly,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(e) => write!(f, "Invalid value: {}", e),
            Error::Mode(e) => write!(f, "Mode error: {}", e),
            Error::Transition(e) => write!(f, "Illegal transition: {}", e),
            Error::Driver(e) => write!(f, "Driver fault: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::ObserverLimit => write!(f, "Observer table is full"),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            Reason::Parse => write!(f, "{}: not an integer", self.attribute),
            Reason::Range { value, min, max } => {
                write!(f, "{}: {} outside [{}, {}]", self.attribute, value, min, max)
            }
            Reason::InvalidMode => match self.attribute.family() {
                Some(family) => {
                    write!(f, "{}: {}", self.attribute, crate::mode::UnknownMode(family))
                }
                None => write!(f, "{}: unknown name", self.attribute),
            },
            Reason::ReadOnly => write!(f, "{} is read-only", self.attribute),
        }
    }
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::Illegal { from, event } => {
                write!(f, "{} not accepted in state {}", event, from)
            }
            TransitionError::ResetWhileActive { state } => {
                write!(f, "reset requires idle, motor is {}", state)
            }
            TransitionError::EstopEngaged => write!(f, "emergency stop is engaged"),
            TransitionError::Stopping => write!(f, "run refused, motor is still stopping"),
            TransitionError::Locked { attribute, state } => {
                write!(f, "{} cannot change while {}", attribute, state)
            }
        }
    }
}

impl fmt::Display for DriverFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverFault::Pin => write!(f, "bridge pin operation failed"),
            DriverFault::Pwm => write!(f, "PWM operation failed"),
            DriverFault::Encoder => write!(f, "encoder feedback fault"),
            DriverFault::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::MotorNotFound(port) => write!(f, "Motor '{}' not found", port),
            ConfigError::InvalidPortName => write!(f, "Port name must be 1-32 bytes"),
            ConfigError::DuplicatePort(port) => write!(f, "Port '{}' is already registered", port),
            ConfigError::TooManyMotors => write!(f, "Too many motors"),
            ConfigError::InvalidSetting { port, error } => {
                write!(f, "Motor '{}': {}", port, error)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<UnknownMode> for Error {
    fn from(e: UnknownMode) -> Self {
        Error::Mode(e)
    }
}

impl From<TransitionError> for Error {
    fn from(e: TransitionError) -> Self {
        Error::Transition(e)
    }
}

impl From<DriverFault> for Error {
    fn from(e: DriverFault) -> Self {
        Error::Driver(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ValidationError {}

#[cfg(feature = "std")]
impl std::error::Error for TransitionError {}

#[cfg(feature = "std")]
impl std::error::Error for DriverFault {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let range = Error::from(ValidationError::new(
            Attribute::DutyCycleSp,
            Reason::Range { value: 150, min: -100, max: 100 },
        ));
        assert_eq!(range.kind(), ErrorKind::Range);

        let parse = Error::from(ValidationError::new(Attribute::TimeSp, Reason::Parse));
        assert_eq!(parse.kind(), ErrorKind::Parse);

        let reset = Error::from(TransitionError::ResetWhileActive {
            state: MotionState::RampUp,
        });
        assert_eq!(reset.kind(), ErrorKind::IllegalTransition);

        assert_eq!(Error::from(DriverFault::Pin).kind(), ErrorKind::DriverFault);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_display_lists_legal_names() {
        let err = ValidationError::new(Attribute::StopMode, Reason::InvalidMode);
        assert_eq!(
            err.to_string(),
            "stop_mode: unknown stop mode; expected one of: coast brake hold"
        );
    }
}
