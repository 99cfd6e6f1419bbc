//! Name tables for every mode family.

mode_table! {
    /// Closed-loop speed regulation.
    pub enum RegulationMode in Regulation {
        /// Open loop: the duty-cycle setpoint drives the output.
        #[default]
        Off => "off",
        /// Closed loop: the pulses-per-second setpoint is regulated.
        On => "on",
    }
}

mode_table! {
    /// Policy applied when the motor enters the stop state.
    pub enum StopMode in Stop {
        /// Power removed, free rotation.
        #[default]
        Coast => "coast",
        /// Power removed, electrical braking.
        Brake => "brake",
        /// Position actively held.
        Hold => "hold",
    }
}

mode_table! {
    /// Interpretation of the position setpoint.
    pub enum PositionMode in Position {
        /// Setpoint is an absolute encoder position.
        #[default]
        Absolute => "absolute",
        /// Setpoint is an offset from the position at run start.
        Relative => "relative",
    }
}

mode_table! {
    /// Terminal condition of a run.
    pub enum RunMode in Run {
        /// Run until stopped.
        #[default]
        Forever => "forever",
        /// Run for the time setpoint.
        Time => "time",
        /// Run to the position setpoint.
        Position => "position",
    }
}

mode_table! {
    /// Output polarity.
    pub enum PolarityMode in Polarity {
        /// Positive duty turns the shaft forward.
        #[default]
        Normal => "normal",
        /// Positive duty turns the shaft backward.
        Inverted => "inverted",
    }
}

mode_table! {
    /// Encoder counting direction.
    pub enum EncoderMode in Encoder {
        /// Forward rotation counts up.
        #[default]
        Normal => "normal",
        /// Forward rotation counts down.
        Inverted => "inverted",
    }
}

mode_table! {
    /// Motor hardware type.
    pub enum MotorType in MotorType {
        /// Large tacho motor.
        #[default]
        Tacho => "tacho",
        /// Medium (mini) tacho motor.
        MiniTacho => "minitacho",
    }
}

mode_table! {
    /// Motion-control state.
    ///
    /// Exactly one state is active at a time. `Idle` is the initial state.
    pub enum MotionState in MotionState {
        /// Continuous motion at the duty setpoint until stopped.
        RunForever => "run_forever",
        /// Preparing a time-terminated ramp.
        SetupRampTime => "setup_ramp_time",
        /// Preparing a position-terminated ramp.
        SetupRampPosition => "setup_ramp_position",
        /// Preparing a regulated ramp.
        SetupRampRegulation => "setup_ramp_regulation",
        /// Accelerating toward the setpoint.
        RampUp => "ramp_up",
        /// Holding the setpoint.
        RampConst => "ramp_const",
        /// Decelerating onto the target position.
        PositionRampDown => "position_ramp_down",
        /// Decelerating over the ramp-down time.
        RampDown => "ramp_down",
        /// Applying the stop policy.
        Stop => "stop",
        /// No motion, nothing pending.
        #[default]
        Idle => "idle",
    }
}

impl MotionState {
    /// `true` while a motion profile is executing (any state but `Idle` and `Stop`).
    #[inline]
    pub fn is_active(self) -> bool {
        !matches!(self, MotionState::Idle | MotionState::Stop)
    }

    /// `true` for the three transient setup states.
    #[inline]
    pub fn is_setup(self) -> bool {
        matches!(
            self,
            MotionState::SetupRampTime
                | MotionState::SetupRampPosition
                | MotionState::SetupRampRegulation
        )
    }
}
