//! # tacho-motor
//!
//! Device-independent core for encoder-feedback ("tacho") DC motors.
//!
//! ## Features
//!
//! - **Mode registry**: closed name tables for every enumerated setting
//! - **Validated writes**: textual input is parsed and range-checked before
//!   any state changes
//! - **Capability trait**: one [`TachoMotorDriver`] implementation per motor
//!   controller
//! - **Motion state machine**: ten states, driven by the control loop, owned
//!   by the device
//! - **Notifications**: bounded, non-blocking state-change observers
//! - **Configuration-driven**: per-port defaults from TOML files
//! - **no_std compatible**: core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tacho_motor::{Attribute, MotorClass, MotionState};
//! use tacho_motor::drivers::HBridgeMotor;
//!
//! let config = tacho_motor::load_config("motors.toml")?;
//! let mut class = MotorClass::from_config(config);
//!
//! let mut motor = class.register("outA", HBridgeMotor::new(in1, in2, pwm))?;
//! motor.write(Attribute::DutyCycleSp, "50")?;
//! motor.write(Attribute::RunMode, "forever")?;
//! motor.write(Attribute::Run, "1")?;
//! assert_eq!(motor.state(), MotionState::RunForever);
//!
//! // Control loop
//! loop {
//!     motor.driver_mut().count_pulses(encoder.take());
//!     motor.driver_mut().tick(1);
//!     motor.poll()?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing, `SharedMotor` and
//!   channel observers
//! - `alloc`: Boxed observer closures for no_std with allocator
//! - `log` (default): Internal logging through the `log` facade
//! - `defmt`: defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod drivers;
pub mod error;
pub mod mode;
pub mod motor;
pub mod validate;

// Re-exports for ergonomic API
pub use config::{validate_config, MotorConfig, SystemConfig};
pub use error::{Error, ErrorKind, Result};
pub use mode::{
    EncoderMode, ModeFamily, ModeName, MotionState, MotorType, PolarityMode, PositionMode,
    RegulationMode, RunMode, StopMode,
};
pub use motor::{
    AttributeValue, MotionEvent, MotorClass, MotorDevice, MotorSettings, MotorSnapshot, PidGain,
    StateChange, TachoMotorDriver,
};
pub use validate::{validate, Attribute, Write};

#[cfg(feature = "std")]
pub use motor::SharedMotor;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
