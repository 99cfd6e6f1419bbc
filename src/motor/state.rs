//! Motion state machine.
//!
//! Ten states, one active at a time. A run request leaves `Idle` through
//! `RunForever` or one of the setup states; driver-reported events walk the
//! ramp forward; a halt forces `Stop` from anywhere; `Stop` settles back to
//! `Idle` once the stop policy has been applied.
//!
//! ```text
//! Idle --start--> RunForever ---------------------------------+
//!      --start--> SetupRampTime ------+                        |
//!      --start--> SetupRampPosition --+-> RampUp -> RampConst  |
//!      --start--> SetupRampRegulation +              |         |
//!                     RampDown <--------(time/reg)---+         |
//!                     PositionRampDown <--(position)-+         |
//!                          |                                   |
//!                          +-----------> Stop <---- halt ------+
//!                                          |
//!                                        Idle
//! ```

use core::fmt;

use crate::error::TransitionError;
use crate::mode::{MotionState, RegulationMode, RunMode};

/// Progress reported by a driver's control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionEvent {
    /// Setup finished; start ramping up.
    SetupComplete,
    /// Ramp-up finished; hold the setpoint.
    RampUpComplete,
    /// Terminal condition approaching; start decelerating.
    RampDownTriggered,
    /// Time/regulation ramp-down finished.
    RampDownComplete,
    /// Position ramp-down reached the target.
    TargetReached,
    /// Stop policy applied; settle to idle.
    StopApplied,
}

impl MotionEvent {
    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            MotionEvent::SetupComplete => "setup_complete",
            MotionEvent::RampUpComplete => "ramp_up_complete",
            MotionEvent::RampDownTriggered => "ramp_down_triggered",
            MotionEvent::RampDownComplete => "ramp_down_complete",
            MotionEvent::TargetReached => "target_reached",
            MotionEvent::StopApplied => "stop_applied",
        }
    }
}

impl fmt::Display for MotionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal condition selected by the setup state of a ramped run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampKind {
    /// Ends after the time setpoint.
    Time,
    /// Ends at the position setpoint.
    Position,
    /// Regulated speed target, ends on request.
    Regulation,
}

impl RampKind {
    /// Setup state that opens this kind of ramp.
    pub fn setup_state(self) -> MotionState {
        match self {
            RampKind::Time => MotionState::SetupRampTime,
            RampKind::Position => MotionState::SetupRampPosition,
            RampKind::Regulation => MotionState::SetupRampRegulation,
        }
    }

    /// Deceleration state used by this kind of ramp.
    pub fn ramp_down_state(self) -> MotionState {
        match self {
            RampKind::Position => MotionState::PositionRampDown,
            RampKind::Time | RampKind::Regulation => MotionState::RampDown,
        }
    }
}

/// A committed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    /// State before the change.
    pub from: MotionState,
    /// State after the change.
    pub to: MotionState,
}

/// Runtime motion state plus the ramp kind of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionStateMachine {
    state: MotionState,
    kind: Option<RampKind>,
}

impl Default for MotionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionStateMachine {
    /// Create a machine in `Idle`.
    pub const fn new() -> Self {
        Self {
            state: MotionState::Idle,
            kind: None,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Ramp kind of the run in progress, if it is a ramped run.
    #[inline]
    pub fn ramp_kind(&self) -> Option<RampKind> {
        self.kind
    }

    /// `true` while a motion profile is executing.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Entry state for a run request.
    pub fn entry_state(
        run_mode: RunMode,
        regulation: RegulationMode,
    ) -> (MotionState, Option<RampKind>) {
        match (run_mode, regulation) {
            (RunMode::Forever, RegulationMode::Off) => (MotionState::RunForever, None),
            (RunMode::Forever, RegulationMode::On) => {
                (RampKind::Regulation.setup_state(), Some(RampKind::Regulation))
            }
            (RunMode::Time, _) => (RampKind::Time.setup_state(), Some(RampKind::Time)),
            (RunMode::Position, _) => (RampKind::Position.setup_state(), Some(RampKind::Position)),
        }
    }

    /// Leave `Idle` for the entry state of `run_mode`.
    ///
    /// Returns `None` when a run is already in progress.
    pub fn start(
        &mut self,
        run_mode: RunMode,
        regulation: RegulationMode,
    ) -> Option<Transition> {
        if self.state != MotionState::Idle {
            return None;
        }
        let (to, kind) = Self::entry_state(run_mode, regulation);
        self.kind = kind;
        Some(self.enter(to))
    }

    /// Force `Stop` from any state but `Idle` and `Stop`.
    pub fn halt(&mut self) -> Option<Transition> {
        match self.state {
            MotionState::Idle | MotionState::Stop => None,
            _ => Some(self.enter(MotionState::Stop)),
        }
    }

    /// Target of `event` from `state` for a run of `kind`, if legal.
    pub fn next_state(
        state: MotionState,
        kind: Option<RampKind>,
        event: MotionEvent,
    ) -> Option<MotionState> {
        use MotionEvent as E;
        use MotionState as S;

        match (state, event) {
            (s, E::SetupComplete) if s.is_setup() => Some(S::RampUp),
            (S::RampUp, E::RampUpComplete) => Some(S::RampConst),
            (S::RampConst, E::RampDownTriggered) => kind.map(RampKind::ramp_down_state),
            (S::RampDown, E::RampDownComplete) => Some(S::Stop),
            (S::PositionRampDown, E::TargetReached) => Some(S::Stop),
            (S::Stop, E::StopApplied) => Some(S::Idle),
            _ => None,
        }
    }

    /// Apply a driver-reported event.
    ///
    /// # Errors
    ///
    /// `TransitionError::Illegal` when the event has no edge out of the
    /// current state; the state is left unchanged.
    pub fn advance(&mut self, event: MotionEvent) -> Result<Transition, TransitionError> {
        let to = Self::next_state(self.state, self.kind, event).ok_or(TransitionError::Illegal {
            from: self.state,
            event,
        })?;
        Ok(self.enter(to))
    }

    /// Check that a reset is allowed.
    pub fn check_reset(&self) -> Result<(), TransitionError> {
        if self.state == MotionState::Idle {
            Ok(())
        } else {
            Err(TransitionError::ResetWhileActive { state: self.state })
        }
    }

    fn enter(&mut self, to: MotionState) -> Transition {
        let from = self.state;
        self.state = to;
        if to == MotionState::Idle {
            self.kind = None;
        }
        Transition { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ModeName;

    fn drive(
        machine: &mut MotionStateMachine,
        events: &[MotionEvent],
    ) -> heapless::Vec<MotionState, 16> {
        let mut seen = heapless::Vec::new();
        for &event in events {
            let t = machine.advance(event).unwrap();
            seen.push(t.to).unwrap();
        }
        seen
    }

    #[test]
    fn test_starts_idle() {
        let machine = MotionStateMachine::new();
        assert_eq!(machine.state(), MotionState::Idle);
        assert!(!machine.is_active());
        assert_eq!(machine.ramp_kind(), None);
    }

    #[test]
    fn test_time_run_sequence() {
        let mut machine = MotionStateMachine::new();
        let t = machine.start(RunMode::Time, RegulationMode::Off).unwrap();
        assert_eq!(t.to, MotionState::SetupRampTime);

        let seen = drive(
            &mut machine,
            &[
                MotionEvent::SetupComplete,
                MotionEvent::RampUpComplete,
                MotionEvent::RampDownTriggered,
                MotionEvent::RampDownComplete,
                MotionEvent::StopApplied,
            ],
        );
        assert_eq!(
            seen.as_slice(),
            &[
                MotionState::RampUp,
                MotionState::RampConst,
                MotionState::RampDown,
                MotionState::Stop,
                MotionState::Idle,
            ]
        );
        assert_eq!(machine.ramp_kind(), None);
    }

    #[test]
    fn test_position_run_uses_position_ramp_down() {
        let mut machine = MotionStateMachine::new();
        machine.start(RunMode::Position, RegulationMode::On).unwrap();
        assert_eq!(machine.state(), MotionState::SetupRampPosition);

        drive(
            &mut machine,
            &[
                MotionEvent::SetupComplete,
                MotionEvent::RampUpComplete,
                MotionEvent::RampDownTriggered,
            ],
        );
        assert_eq!(machine.state(), MotionState::PositionRampDown);

        // Time-style completion is not an edge out of PositionRampDown
        assert!(machine.advance(MotionEvent::RampDownComplete).is_err());
        assert_eq!(machine.state(), MotionState::PositionRampDown);

        machine.advance(MotionEvent::TargetReached).unwrap();
        assert_eq!(machine.state(), MotionState::Stop);
    }

    #[test]
    fn test_forever_entry() {
        let mut machine = MotionStateMachine::new();
        machine.start(RunMode::Forever, RegulationMode::Off).unwrap();
        assert_eq!(machine.state(), MotionState::RunForever);
        // No event moves RunForever along
        assert!(machine.advance(MotionEvent::RampDownTriggered).is_err());

        let mut regulated = MotionStateMachine::new();
        regulated.start(RunMode::Forever, RegulationMode::On).unwrap();
        assert_eq!(regulated.state(), MotionState::SetupRampRegulation);
    }

    #[test]
    fn test_start_ignored_when_running() {
        let mut machine = MotionStateMachine::new();
        machine.start(RunMode::Time, RegulationMode::Off).unwrap();
        assert_eq!(machine.start(RunMode::Position, RegulationMode::Off), None);
        assert_eq!(machine.state(), MotionState::SetupRampTime);
    }

    #[test]
    fn test_halt_from_every_active_state() {
        for &state in MotionState::ALL {
            let mut machine = MotionStateMachine { state, kind: Some(RampKind::Time) };
            let t = machine.halt();
            if state.is_active() {
                assert_eq!(t, Some(Transition { from: state, to: MotionState::Stop }));
            } else {
                assert_eq!(t, None);
                assert_eq!(machine.state(), state);
            }
        }
    }

    #[test]
    fn test_reset_only_from_idle() {
        let mut machine = MotionStateMachine::new();
        assert!(machine.check_reset().is_ok());
        machine.start(RunMode::Forever, RegulationMode::Off).unwrap();
        assert_eq!(
            machine.check_reset(),
            Err(TransitionError::ResetWhileActive { state: MotionState::RunForever })
        );
    }

    #[test]
    fn test_illegal_event_from_idle() {
        let mut machine = MotionStateMachine::new();
        let err = machine.advance(MotionEvent::StopApplied).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Illegal { from: MotionState::Idle, event: MotionEvent::StopApplied }
        );
    }
}
