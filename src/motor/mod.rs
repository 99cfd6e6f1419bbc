//! Motor module for tacho-motor.
//!
//! Provides the device core: the driver capability trait, the motion state
//! machine, state-change notification and registration bookkeeping.

mod builder;
mod class;
mod device;
mod driver;
pub mod notify;
mod settings;
#[cfg(feature = "std")]
mod shared;
mod snapshot;
pub mod state;

pub use builder::MotorDeviceBuilder;
pub use class::{MotorClass, Rejected, MAX_MOTORS};
pub use device::{MotorDevice, DEVICE_NAME_PREFIX};
pub use driver::TachoMotorDriver;
pub use notify::{Notifier, Observer, ObserverId, StateChange, MAX_OBSERVERS};
pub use settings::{MotorSettings, PidGain, PidGains};
#[cfg(feature = "std")]
pub use shared::SharedMotor;
pub use snapshot::{AttributeValue, MotorSnapshot};
pub use state::{MotionEvent, MotionStateMachine, RampKind, Transition};
