//! Builder pattern for MotorDevice.

use crate::config::{MotorConfig, SystemConfig};
use crate::error::{ConfigError, Error, Result};

use super::device::MotorDevice;
use super::driver::TachoMotorDriver;
use super::settings::MotorSettings;

/// Builder for creating MotorDevice instances.
pub struct MotorDeviceBuilder<D>
where
    D: TachoMotorDriver,
{
    driver: Option<D>,
    port_name: Option<heapless::String<32>>,
    ordinal: u32,
    settings: Option<MotorSettings>,
}

impl<D> Default for MotorDeviceBuilder<D>
where
    D: TachoMotorDriver,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D> MotorDeviceBuilder<D>
where
    D: TachoMotorDriver,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            driver: None,
            port_name: None,
            ordinal: 0,
            settings: None,
        }
    }

    /// Set the driver.
    pub fn driver(mut self, driver: D) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Set the port name.
    ///
    /// Names longer than 32 bytes are rejected by [`build`](Self::build).
    pub fn port_name(mut self, name: &str) -> Self {
        self.port_name = heapless::String::try_from(name).ok();
        self
    }

    /// Set the device ordinal.
    pub fn ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = ordinal;
        self
    }

    /// Initial modes, setpoints and gains.
    pub fn settings(mut self, settings: MotorSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Configure from a MotorConfig.
    pub fn from_motor_config(mut self, config: &MotorConfig) -> Self {
        self.settings = Some(config.settings());
        self
    }

    /// Configure from SystemConfig by port name.
    pub fn from_config(self, config: &SystemConfig, port_name: &str) -> Result<Self> {
        let motor_config = config.motor(port_name).ok_or_else(|| {
            Error::Config(ConfigError::MotorNotFound(
                heapless::String::try_from(port_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.port_name(port_name).from_motor_config(motor_config))
    }

    /// Build the MotorDevice.
    ///
    /// Configured settings go through the same validation as attribute
    /// writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver or port name is missing, or a
    /// configured value is rejected.
    pub fn build(self) -> Result<MotorDevice<D>> {
        let driver = self.driver.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("driver is required").unwrap_or_default(),
            ))
        })?;

        let port_name = self
            .port_name
            .ok_or(Error::Config(ConfigError::InvalidPortName))?;

        let mut device = MotorDevice::new(&port_name, self.ordinal, driver)?;
        if let Some(settings) = self.settings {
            device.apply_settings(&settings)?;
        }
        Ok(device)
    }
}
