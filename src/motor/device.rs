//! The motor device: one registered motor and its driver.

use core::fmt::Write as _;

use heapless::String;

use crate::error::{ConfigError, Error, Result, TransitionError};
use crate::mode::{
    EncoderMode, ModeName, MotionState, MotorType, PolarityMode, PositionMode, RegulationMode,
    RunMode, StopMode,
};
use crate::validate::{check_value, validate, Attribute, Write};

use super::driver::TachoMotorDriver;
use super::notify::{Notifier, Observer, ObserverId, StateChange};
use super::settings::{MotorSettings, PidGain, PidGains};
use super::snapshot::{AttributeValue, MotorSnapshot};
use super::state::{MotionEvent, MotionStateMachine, RampKind, Transition};

/// Prefix of generated device names.
pub const DEVICE_NAME_PREFIX: &str = "tacho-motor";

/// A tacho motor bound to its port.
///
/// The device owns the driver and the motion state machine. Every write is
/// validated in full before the driver sees it, so a rejected write leaves
/// the device untouched. The state reported by [`state`](Self::state) is the
/// one the machine holds; drivers only propose events.
///
/// # Example
///
/// ```rust,ignore
/// let mut motor = MotorDevice::new("outA", 0, driver)?;
/// motor.write(Attribute::DutyCycleSp, "50")?;
/// motor.write(Attribute::RunMode, "forever")?;
/// motor.write(Attribute::Run, "1")?;
/// assert_eq!(motor.state(), MotionState::RunForever);
/// ```
#[derive(Debug)]
pub struct MotorDevice<D> {
    port_name: String<32>,
    ordinal: u32,
    name: String<24>,
    driver: D,
    machine: MotionStateMachine,
    run: bool,
    estop: bool,
    notifier: Notifier,
}

impl<D: TachoMotorDriver> MotorDevice<D> {
    /// Bind `driver` to `port_name`.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidPortName` when the port name is empty or longer
    /// than 32 bytes.
    pub fn new(port_name: &str, ordinal: u32, driver: D) -> Result<Self> {
        if port_name.is_empty() {
            return Err(Error::Config(ConfigError::InvalidPortName));
        }
        let port_name =
            String::try_from(port_name).map_err(|_| Error::Config(ConfigError::InvalidPortName))?;
        Ok(Self::on_port(port_name, ordinal, driver))
    }

    /// Bind `driver` to an already checked, non-empty port name.
    pub(crate) fn on_port(port_name: String<32>, ordinal: u32, driver: D) -> Self {
        let mut name = String::new();
        // "tacho-motor" plus at most ten digits always fits
        let _ = write!(name, "{}{}", DEVICE_NAME_PREFIX, ordinal);

        Self {
            port_name,
            ordinal,
            name,
            driver,
            machine: MotionStateMachine::new(),
            run: false,
            estop: false,
            notifier: Notifier::new(),
        }
    }

    // ========== Identity ==========

    /// Port the motor is attached to.
    #[inline]
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Ordinal assigned at registration.
    #[inline]
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Device name, `tacho-motor<ordinal>`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ========== Motion state ==========

    /// Current motion state.
    #[inline]
    pub fn state(&self) -> MotionState {
        self.machine.state()
    }

    /// Ramp kind of the run in progress.
    #[inline]
    pub fn ramp_kind(&self) -> Option<RampKind> {
        self.machine.ramp_kind()
    }

    /// `true` while a motion profile is executing.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.machine.is_active()
    }

    /// Run flag.
    #[inline]
    pub fn run(&self) -> bool {
        self.run
    }

    /// Emergency stop latch.
    #[inline]
    pub fn estop(&self) -> bool {
        self.estop
    }

    // ========== Measurements ==========

    /// Measured position in encoder pulses.
    pub fn position(&self) -> i32 {
        self.driver.position()
    }

    /// Applied duty cycle.
    pub fn duty_cycle(&self) -> i32 {
        self.driver.duty_cycle()
    }

    /// Measured speed.
    pub fn pulses_per_second(&self) -> i32 {
        self.driver.pulses_per_second()
    }

    // ========== Stored settings ==========

    /// Motor type.
    pub fn motor_type(&self) -> MotorType {
        self.driver.motor_type()
    }

    /// Run mode.
    pub fn run_mode(&self) -> RunMode {
        self.driver.run_mode()
    }

    /// Regulation mode.
    pub fn regulation_mode(&self) -> RegulationMode {
        self.driver.regulation_mode()
    }

    /// Stop mode.
    pub fn stop_mode(&self) -> StopMode {
        self.driver.stop_mode()
    }

    /// Legal stop mode names.
    pub fn stop_modes(&self) -> &'static [&'static str] {
        StopMode::NAMES
    }

    /// Position mode.
    pub fn position_mode(&self) -> PositionMode {
        self.driver.position_mode()
    }

    /// Polarity mode.
    pub fn polarity_mode(&self) -> PolarityMode {
        self.driver.polarity_mode()
    }

    /// Encoder mode.
    pub fn encoder_mode(&self) -> EncoderMode {
        self.driver.encoder_mode()
    }

    /// Duty-cycle setpoint.
    pub fn duty_cycle_sp(&self) -> i32 {
        self.driver.duty_cycle_sp()
    }

    /// Speed setpoint.
    pub fn pulses_per_second_sp(&self) -> i32 {
        self.driver.pulses_per_second_sp()
    }

    /// Run duration setpoint.
    pub fn time_sp(&self) -> i32 {
        self.driver.time_sp()
    }

    /// Position setpoint.
    pub fn position_sp(&self) -> i32 {
        self.driver.position_sp()
    }

    /// Ramp-up duration.
    pub fn ramp_up_sp(&self) -> i32 {
        self.driver.ramp_up_sp()
    }

    /// Ramp-down duration.
    pub fn ramp_down_sp(&self) -> i32 {
        self.driver.ramp_down_sp()
    }

    /// One speed regulation gain.
    pub fn speed_regulation(&self, gain: PidGain) -> i32 {
        self.driver.speed_regulation(gain)
    }

    /// All stored settings.
    pub fn settings(&self) -> MotorSettings {
        let d = &self.driver;
        let mut pid = PidGains::default();
        for gain in PidGain::ALL {
            pid.set(gain, d.speed_regulation(gain));
        }
        MotorSettings {
            motor_type: d.motor_type(),
            run_mode: d.run_mode(),
            regulation_mode: d.regulation_mode(),
            stop_mode: d.stop_mode(),
            position_mode: d.position_mode(),
            polarity_mode: d.polarity_mode(),
            encoder_mode: d.encoder_mode(),
            duty_cycle_sp: d.duty_cycle_sp(),
            pulses_per_second_sp: d.pulses_per_second_sp(),
            time_sp: d.time_sp(),
            position_sp: d.position_sp(),
            ramp_up_sp: d.ramp_up_sp(),
            ramp_down_sp: d.ramp_down_sp(),
            pid,
        }
    }

    /// Capture every readable field.
    pub fn snapshot(&self) -> MotorSnapshot {
        MotorSnapshot {
            port_name: self.port_name.clone(),
            ordinal: self.ordinal,
            state: self.state(),
            position: self.position(),
            duty_cycle: self.duty_cycle(),
            pulses_per_second: self.pulses_per_second(),
            run: self.run,
            estop: self.estop,
            settings: self.settings(),
        }
    }

    // ========== Typed setters ==========

    /// Select the motor type.
    pub fn set_motor_type(&mut self, motor_type: MotorType) -> Result<()> {
        self.apply(Write::Type(motor_type))
    }

    /// Reseed the measured position.
    pub fn set_position(&mut self, position: i32) -> Result<()> {
        self.apply(Write::Position(position))
    }

    /// Store the duty-cycle setpoint.
    ///
    /// # Errors
    ///
    /// `Range` outside ±100; the stored value is unchanged.
    pub fn set_duty_cycle_sp(&mut self, value: i32) -> Result<()> {
        let value = check_value(Attribute::DutyCycleSp, value.into())?;
        self.apply(Write::DutyCycleSp(value))
    }

    /// Store the speed setpoint.
    pub fn set_pulses_per_second_sp(&mut self, value: i32) -> Result<()> {
        let value = check_value(Attribute::PulsesPerSecondSp, value.into())?;
        self.apply(Write::PulsesPerSecondSp(value))
    }

    /// Store the run duration setpoint.
    pub fn set_time_sp(&mut self, value: i32) -> Result<()> {
        let value = check_value(Attribute::TimeSp, value.into())?;
        self.apply(Write::TimeSp(value))
    }

    /// Store the position setpoint.
    pub fn set_position_sp(&mut self, value: i32) -> Result<()> {
        self.apply(Write::PositionSp(value))
    }

    /// Store the ramp-up duration.
    pub fn set_ramp_up_sp(&mut self, value: i32) -> Result<()> {
        let value = check_value(Attribute::RampUpSp, value.into())?;
        self.apply(Write::RampUpSp(value))
    }

    /// Store the ramp-down duration.
    pub fn set_ramp_down_sp(&mut self, value: i32) -> Result<()> {
        let value = check_value(Attribute::RampDownSp, value.into())?;
        self.apply(Write::RampDownSp(value))
    }

    /// Store one speed regulation gain.
    pub fn set_speed_regulation(&mut self, gain: PidGain, value: i32) -> Result<()> {
        let value = check_value(Attribute::from(gain), value.into())?;
        self.apply(Write::SpeedRegulation(gain, value))
    }

    /// Select the run mode.
    pub fn set_run_mode(&mut self, mode: RunMode) -> Result<()> {
        self.apply(Write::RunMode(mode))
    }

    /// Select the regulation mode.
    pub fn set_regulation_mode(&mut self, mode: RegulationMode) -> Result<()> {
        self.apply(Write::RegulationMode(mode))
    }

    /// Select the stop mode.
    pub fn set_stop_mode(&mut self, mode: StopMode) -> Result<()> {
        self.apply(Write::StopMode(mode))
    }

    /// Select the position mode.
    pub fn set_position_mode(&mut self, mode: PositionMode) -> Result<()> {
        self.apply(Write::PositionMode(mode))
    }

    /// Select the polarity mode.
    pub fn set_polarity_mode(&mut self, mode: PolarityMode) -> Result<()> {
        self.apply(Write::PolarityMode(mode))
    }

    /// Select the encoder mode.
    pub fn set_encoder_mode(&mut self, mode: EncoderMode) -> Result<()> {
        self.apply(Write::EncoderMode(mode))
    }

    /// Apply every field of `settings`.
    ///
    /// Values are checked one by one; the first failure stops the update and
    /// the fields before it stay applied.
    pub fn apply_settings(&mut self, settings: &MotorSettings) -> Result<()> {
        self.set_motor_type(settings.motor_type)?;
        self.set_run_mode(settings.run_mode)?;
        self.set_regulation_mode(settings.regulation_mode)?;
        self.set_stop_mode(settings.stop_mode)?;
        self.set_position_mode(settings.position_mode)?;
        self.set_polarity_mode(settings.polarity_mode)?;
        self.set_encoder_mode(settings.encoder_mode)?;
        self.set_duty_cycle_sp(settings.duty_cycle_sp)?;
        self.set_pulses_per_second_sp(settings.pulses_per_second_sp)?;
        self.set_time_sp(settings.time_sp)?;
        self.set_position_sp(settings.position_sp)?;
        self.set_ramp_up_sp(settings.ramp_up_sp)?;
        self.set_ramp_down_sp(settings.ramp_down_sp)?;
        for gain in PidGain::ALL {
            self.set_speed_regulation(gain, settings.pid.get(gain))?;
        }
        Ok(())
    }

    // ========== Commands ==========

    /// Set or clear the run flag.
    ///
    /// Setting it from `Idle` enters the run mode's entry state. Setting it
    /// while a run is active is a no-op. Clearing it forces `Stop` from any
    /// active state.
    ///
    /// # Errors
    ///
    /// `TransitionError::EstopEngaged` when setting while the emergency stop
    /// is latched, `TransitionError::Stopping` when setting while the
    /// previous run is still in `Stop`. Nothing changes in either case.
    pub fn set_run(&mut self, run: bool) -> Result<()> {
        if !run {
            self.stop();
            return Ok(());
        }

        if self.estop {
            debug!("{}: run refused, emergency stop engaged", self.name.as_str());
            return Err(Error::Transition(TransitionError::EstopEngaged));
        }

        let run_mode = self.driver.run_mode();
        let regulation = self.driver.regulation_mode();
        match self.machine.start(run_mode, regulation) {
            Some(transition) => {
                self.run = true;
                self.commit(transition);
            }
            None if self.machine.is_active() => self.run = true,
            None => {
                debug!("{}: run refused, still stopping", self.name.as_str());
                return Err(Error::Transition(TransitionError::Stopping));
            }
        }
        Ok(())
    }

    /// Clear the run flag, forcing `Stop` from any active state.
    pub fn stop(&mut self) {
        self.run = false;
        if let Some(transition) = self.machine.halt() {
            self.commit(transition);
        }
    }

    /// Engage or release the emergency stop.
    ///
    /// Engaging forces `Stop` before returning and latches until released.
    pub fn set_estop(&mut self, engaged: bool) {
        if engaged {
            if !self.estop {
                warn!("{}: emergency stop engaged in {}", self.name.as_str(), self.state());
            }
            self.estop = true;
            self.run = false;
            self.driver.emergency_stop(true);
            if let Some(transition) = self.machine.halt() {
                self.commit(transition);
            }
        } else if self.estop {
            info!("{}: emergency stop released", self.name.as_str());
            self.estop = false;
            self.driver.emergency_stop(false);
        }
    }

    /// Zero position and setpoints.
    ///
    /// # Errors
    ///
    /// `TransitionError::ResetWhileActive` outside `Idle`; nothing changes.
    pub fn reset(&mut self) -> Result<()> {
        self.machine.check_reset()?;
        self.driver.reset();
        info!("{}: reset", self.name.as_str());
        Ok(())
    }

    /// Apply a control-loop event.
    ///
    /// # Errors
    ///
    /// `TransitionError::Illegal` when the event has no edge out of the
    /// current state; nothing changes.
    pub fn advance(&mut self, event: MotionEvent) -> Result<MotionState> {
        let transition = self.machine.advance(event).map_err(|e| {
            debug!("{}: {} refused in {}", self.name.as_str(), event, self.machine.state());
            e
        })?;
        self.commit(transition);
        Ok(transition.to)
    }

    /// Run one control-loop step of the driver.
    ///
    /// Returns the new state when the driver reported an event.
    ///
    /// # Errors
    ///
    /// `Error::Driver` with the driver's fault, state unchanged.
    pub fn poll(&mut self) -> Result<Option<MotionState>> {
        let state = self.machine.state();
        match self.driver.poll(state) {
            Ok(Some(event)) => self.advance(event).map(Some),
            Ok(None) => Ok(None),
            Err(fault) => {
                warn!("{}: driver fault in {}", self.name.as_str(), state);
                Err(Error::Driver(fault))
            }
        }
    }

    // ========== Attribute surface ==========

    /// Validate `input` and apply it to `attribute`.
    ///
    /// # Errors
    ///
    /// Any validation error, with nothing applied, or the error of the
    /// command the write stands for.
    pub fn write(&mut self, attribute: Attribute, input: &str) -> Result<()> {
        let write = validate(attribute, input).map_err(|e| {
            debug!("{}: rejected write to {}", self.name.as_str(), attribute);
            e
        })?;
        self.apply(write)
    }

    /// Current value of `attribute`. `None` for write-only attributes.
    pub fn read(&self, attribute: Attribute) -> Option<AttributeValue> {
        let d = &self.driver;
        let value = match attribute {
            Attribute::PortName => AttributeValue::Port(self.port_name.clone()),
            Attribute::Type => AttributeValue::Name(d.motor_type().name()),
            Attribute::Position => AttributeValue::Int(d.position()),
            Attribute::State => AttributeValue::Name(self.state().name()),
            Attribute::DutyCycle => AttributeValue::Int(d.duty_cycle()),
            Attribute::PulsesPerSecond => AttributeValue::Int(d.pulses_per_second()),
            Attribute::DutyCycleSp => AttributeValue::Int(d.duty_cycle_sp()),
            Attribute::PulsesPerSecondSp => AttributeValue::Int(d.pulses_per_second_sp()),
            Attribute::TimeSp => AttributeValue::Int(d.time_sp()),
            Attribute::PositionSp => AttributeValue::Int(d.position_sp()),
            Attribute::RunMode => AttributeValue::Name(d.run_mode().name()),
            Attribute::RegulationMode => AttributeValue::Name(d.regulation_mode().name()),
            Attribute::StopModes => AttributeValue::Names(StopMode::NAMES),
            Attribute::StopMode => AttributeValue::Name(d.stop_mode().name()),
            Attribute::PositionMode => AttributeValue::Name(d.position_mode().name()),
            Attribute::PolarityMode => AttributeValue::Name(d.polarity_mode().name()),
            Attribute::EncoderMode => AttributeValue::Name(d.encoder_mode().name()),
            Attribute::RampUpSp => AttributeValue::Int(d.ramp_up_sp()),
            Attribute::RampDownSp => AttributeValue::Int(d.ramp_down_sp()),
            Attribute::SpeedRegulationP
            | Attribute::SpeedRegulationI
            | Attribute::SpeedRegulationD
            | Attribute::SpeedRegulationK => {
                AttributeValue::Int(d.speed_regulation(attribute.pid_gain()?))
            }
            Attribute::Run => AttributeValue::Int(i32::from(self.run)),
            Attribute::Estop => AttributeValue::Int(i32::from(self.estop)),
            Attribute::Reset => return None,
        };
        Some(value)
    }

    /// Whether the driver allows `attribute` to change right now.
    pub fn can_modify(&self, attribute: Attribute) -> bool {
        self.driver.can_modify(attribute, self.state())
    }

    // ========== Observers ==========

    /// Register a state-change observer.
    ///
    /// # Errors
    ///
    /// `Error::ObserverLimit` when the table is full.
    pub fn subscribe(&mut self, observer: Observer) -> Result<ObserverId> {
        self.notifier.subscribe(observer)
    }

    /// Remove an observer.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Swap the observer table, returning the old one.
    pub(crate) fn replace_notifier(&mut self, notifier: Notifier) -> Notifier {
        core::mem::replace(&mut self.notifier, notifier)
    }

    // ========== Driver access ==========

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The driver, mutably. Used to feed measurements into the driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Release the driver.
    pub fn into_driver(self) -> D {
        self.driver
    }

    fn apply(&mut self, write: Write) -> Result<()> {
        let attribute = write.attribute();
        let state = self.machine.state();
        let command = matches!(write, Write::Run(_) | Write::Estop(_) | Write::Reset);
        if !command && !self.driver.can_modify(attribute, state) {
            debug!("{}: {} locked in {}", self.name.as_str(), attribute, state);
            return Err(Error::Transition(TransitionError::Locked { attribute, state }));
        }

        let d = &mut self.driver;
        match write {
            Write::Type(t) => d.set_motor_type(t),
            Write::Position(v) => d.set_position(v),
            Write::DutyCycleSp(v) => d.set_duty_cycle_sp(v),
            Write::PulsesPerSecondSp(v) => d.set_pulses_per_second_sp(v),
            Write::TimeSp(v) => d.set_time_sp(v),
            Write::PositionSp(v) => d.set_position_sp(v),
            Write::RunMode(m) => d.set_run_mode(m),
            Write::RegulationMode(m) => d.set_regulation_mode(m),
            Write::StopMode(m) => d.set_stop_mode(m),
            Write::PositionMode(m) => d.set_position_mode(m),
            Write::PolarityMode(m) => d.set_polarity_mode(m),
            Write::EncoderMode(m) => d.set_encoder_mode(m),
            Write::RampUpSp(v) => d.set_ramp_up_sp(v),
            Write::RampDownSp(v) => d.set_ramp_down_sp(v),
            Write::SpeedRegulation(gain, v) => d.set_speed_regulation(gain, v),
            Write::Run(run) => return self.set_run(run),
            Write::Estop(engaged) => self.set_estop(engaged),
            Write::Reset => return self.reset(),
        }
        Ok(())
    }

    fn commit(&mut self, transition: Transition) {
        let Transition { from, to } = transition;
        self.driver.enter_state(to);
        if to == MotionState::Stop {
            self.run = false;
        }
        debug!("{}: {} -> {}", self.name.as_str(), from, to);
        self.notifier.notify(&StateChange {
            device: self.ordinal,
            from,
            to,
        });
    }
}
