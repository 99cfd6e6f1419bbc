//! Concrete drivers.

mod hbridge;

pub use hbridge::{
    max_pulses_per_second, HBridgeMotor, MINITACHO_MAX_PPS, MIN_APPROACH_DUTY, SPEED_WINDOW_MS,
    TACHO_MAX_PPS,
};
