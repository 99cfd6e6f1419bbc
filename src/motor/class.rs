//! Tacho motor class: registration bookkeeping for multiple motors.

use heapless::{FnvIndexMap, String};

use crate::config::{MotorConfig, SystemConfig};
use crate::error::{ConfigError, Error, Result};

use super::device::MotorDevice;
use super::driver::TachoMotorDriver;

/// Maximum simultaneously registered motors.
pub const MAX_MOTORS: usize = 8;

/// Registration bookkeeping for tacho motors.
///
/// `MotorClass` provides:
/// - A unique ordinal and `tacho-motor<N>` name per registered device
/// - Rejection of empty and duplicate port names
/// - Per-port defaults from configuration, applied on registration
///
/// Devices are owned by the caller because each one is generic over its
/// driver. Ordinals are never reused, even after unregistration.
///
/// # Example
///
/// ```rust,ignore
/// use tacho_motor::motor::MotorClass;
///
/// let config = tacho_motor::load_config("motors.toml")?;
/// let mut class = MotorClass::from_config(config);
///
/// let mut left = class.register("outA", left_driver)?;
/// let mut right = class.register("outB", right_driver)?;
///
/// // Later
/// let left_driver = class.unregister(left);
/// ```
#[derive(Debug, Default)]
pub struct MotorClass {
    /// Per-port defaults.
    config: SystemConfig,
    /// Next ordinal to hand out.
    next_ordinal: u32,
    /// Registered ports and their ordinals.
    registered: FnvIndexMap<String<32>, u32, MAX_MOTORS>,
}

impl MotorClass {
    /// Create a class without configured defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a class from configuration.
    pub fn from_config(config: SystemConfig) -> Self {
        Self {
            config,
            next_ordinal: 0,
            registered: FnvIndexMap::new(),
        }
    }

    /// Get the system configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Get the configured defaults for a port.
    pub fn motor_config(&self, port_name: &str) -> Option<&MotorConfig> {
        self.config.motor(port_name)
    }

    /// Register a motor on `port_name`.
    ///
    /// The port's configured defaults, if any, are applied to the device
    /// before it is returned. The driver is dropped on failure; use
    /// [`try_register`](Self::try_register) to get it back.
    ///
    /// # Errors
    ///
    /// - `InvalidPortName` for an empty or over-long port name
    /// - `DuplicatePort` when the port already has a device
    /// - `TooManyMotors` when [`MAX_MOTORS`] devices are registered
    /// - `InvalidSetting` when a configured default is rejected
    pub fn register<D>(&mut self, port_name: &str, driver: D) -> Result<MotorDevice<D>>
    where
        D: TachoMotorDriver,
    {
        self.try_register(port_name, driver).map_err(Error::from)
    }

    /// Register a motor on `port_name`, handing the driver back on failure.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register), wrapped in [`Rejected`].
    pub fn try_register<D>(
        &mut self,
        port_name: &str,
        driver: D,
    ) -> core::result::Result<MotorDevice<D>, Rejected<D>>
    where
        D: TachoMotorDriver,
    {
        let port = match self.check_port(port_name) {
            Ok(port) => port,
            Err(error) => return Err(Rejected { error, driver }),
        };

        let ordinal = self.next_ordinal;
        let mut device = MotorDevice::on_port(port.clone(), ordinal, driver);
        if let Some(motor_config) = self.config.motor(port_name) {
            if let Err(e) = device.apply_settings(&motor_config.settings()) {
                let error = match e {
                    Error::Validation(error) => {
                        Error::Config(ConfigError::InvalidSetting { port, error })
                    }
                    other => other,
                };
                return Err(Rejected {
                    error,
                    driver: device.into_driver(),
                });
            }
        }

        if self.registered.insert(port, ordinal).is_err() {
            return Err(Rejected {
                error: Error::Config(ConfigError::TooManyMotors),
                driver: device.into_driver(),
            });
        }
        self.next_ordinal = self.next_ordinal.wrapping_add(1);

        info!("{} registered on {}", device.name(), device.port_name());
        Ok(device)
    }

    /// Unregister a device and hand back its driver.
    ///
    /// A motion in progress is stopped first.
    pub fn unregister<D>(&mut self, mut device: MotorDevice<D>) -> D
    where
        D: TachoMotorDriver,
    {
        device.stop();
        let removed = self
            .registered
            .iter()
            .find(|(k, _)| k.as_str() == device.port_name())
            .map(|(k, _)| k.clone());
        if let Some(port) = removed {
            self.registered.remove(&port);
            info!("{} unregistered from {}", device.name(), device.port_name());
        }
        device.into_driver()
    }

    /// Check if a port has a registered device.
    pub fn is_registered(&self, port_name: &str) -> bool {
        self.registered.iter().any(|(k, _)| k.as_str() == port_name)
    }

    /// Ordinal of the device registered on `port_name`.
    pub fn ordinal(&self, port_name: &str) -> Option<u32> {
        self.registered
            .iter()
            .find(|(k, _)| k.as_str() == port_name)
            .map(|(_, v)| *v)
    }

    /// Get the number of registered motors.
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    /// List registered port names.
    pub fn port_names(&self) -> impl Iterator<Item = &str> {
        self.registered.keys().map(|s| s.as_str())
    }

    fn check_port(&self, port_name: &str) -> Result<String<32>> {
        if port_name.is_empty() {
            return Err(Error::Config(ConfigError::InvalidPortName));
        }
        let port: String<32> =
            String::try_from(port_name).map_err(|_| Error::Config(ConfigError::InvalidPortName))?;
        if self.registered.contains_key(&port) {
            return Err(Error::Config(ConfigError::DuplicatePort(port)));
        }
        if self.registered.len() == MAX_MOTORS {
            return Err(Error::Config(ConfigError::TooManyMotors));
        }
        Ok(port)
    }
}

/// A refused registration, with the driver handed back.
#[derive(Debug)]
pub struct Rejected<D> {
    /// Why the device was refused.
    pub error: Error,
    /// The driver passed to [`MotorClass::try_register`].
    pub driver: D,
}

impl<D> From<Rejected<D>> for Error {
    fn from(rejected: Rejected<D>) -> Self {
        rejected.error
    }
}
