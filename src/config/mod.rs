//! Configuration module for tacho-motor.
//!
//! Provides per-port motor defaults loaded from TOML files (with `std`
//! feature) or pre-parsed data.
//!
//! ```toml
//! [motors.outA]
//! type = "tacho"
//! run_mode = "position"
//! stop_mode = "hold"
//! duty_cycle_sp = 60
//! ramp_up_sp = 250
//!
//! [motors.outA.speed_regulation]
//! p = 1
//! i = 0
//! ```

mod motor;
mod system;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use motor::MotorConfig;
pub use system::SystemConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
