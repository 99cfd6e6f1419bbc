//! Mode registry.
//!
//! Immutable name tables for every enumerated motor setting. Each family
//! maps a zero-based ordinal to a canonical lowercase name and back; name
//! lookup ignores ASCII case and surrounding whitespace.

#[macro_use]
mod table;
mod tables;

use core::fmt;

pub use tables::{
    EncoderMode, MotionState, MotorType, PolarityMode, PositionMode, RegulationMode, RunMode,
    StopMode,
};

/// Enumerated mode family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeFamily {
    /// Speed regulation on/off.
    Regulation,
    /// Stop policy.
    Stop,
    /// Absolute or relative position setpoints.
    Position,
    /// Run mode (forever, time, position).
    Run,
    /// Output polarity.
    Polarity,
    /// Encoder counting direction.
    Encoder,
    /// Motor type.
    MotorType,
    /// Motion state.
    MotionState,
}

impl ModeFamily {
    /// All families, in declaration order.
    pub const ALL: [ModeFamily; 8] = [
        ModeFamily::Regulation,
        ModeFamily::Stop,
        ModeFamily::Position,
        ModeFamily::Run,
        ModeFamily::Polarity,
        ModeFamily::Encoder,
        ModeFamily::MotorType,
        ModeFamily::MotionState,
    ];

    /// Canonical names of this family, ordered by ordinal.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            ModeFamily::Regulation => RegulationMode::NAMES,
            ModeFamily::Stop => StopMode::NAMES,
            ModeFamily::Position => PositionMode::NAMES,
            ModeFamily::Run => RunMode::NAMES,
            ModeFamily::Polarity => PolarityMode::NAMES,
            ModeFamily::Encoder => EncoderMode::NAMES,
            ModeFamily::MotorType => MotorType::NAMES,
            ModeFamily::MotionState => MotionState::NAMES,
        }
    }

    /// Number of entries in this family.
    #[inline]
    pub fn len(self) -> usize {
        self.names().len()
    }

    /// Always `false`; every family has at least one entry.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.names().is_empty()
    }

    /// Short label used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            ModeFamily::Regulation => "regulation mode",
            ModeFamily::Stop => "stop mode",
            ModeFamily::Position => "position mode",
            ModeFamily::Run => "run mode",
            ModeFamily::Polarity => "polarity mode",
            ModeFamily::Encoder => "encoder mode",
            ModeFamily::MotorType => "motor type",
            ModeFamily::MotionState => "motion state",
        }
    }
}

impl fmt::Display for ModeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A name was not found in a family's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownMode(pub ModeFamily);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}; expected one of:", self.0)?;
        for name in self.0.names() {
            write!(f, " {}", name)?;
        }
        Ok(())
    }
}

/// Typed access to one family's table.
///
/// Implemented by every enum generated with `mode_table!`.
pub trait ModeName: Copy + Sized + 'static {
    /// Family this enum belongs to.
    const FAMILY: ModeFamily;

    /// Every value, ordered by ordinal.
    const ALL: &'static [Self];

    /// Canonical names, ordered by ordinal.
    const NAMES: &'static [&'static str];

    /// Zero-based ordinal of this value.
    fn ordinal(self) -> usize;

    /// Value at `ordinal`, if in range.
    #[inline]
    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    /// Canonical name.
    #[inline]
    fn name(self) -> &'static str {
        Self::NAMES[self.ordinal()]
    }

    /// Case-insensitive name lookup.
    fn from_name(name: &str) -> Result<Self, UnknownMode> {
        ordinal_of(Self::FAMILY, name)
            .and_then(|i| Self::from_ordinal(i).ok_or(UnknownMode(Self::FAMILY)))
    }
}

/// Canonical name of `ordinal` in `family`.
///
/// Returns `None` when the ordinal is out of range.
#[inline]
pub fn name_of(family: ModeFamily, ordinal: usize) -> Option<&'static str> {
    family.names().get(ordinal).copied()
}

/// Ordinal of `name` in `family`.
///
/// Matching ignores ASCII case and leading/trailing whitespace, so a value
/// written with a trailing newline still matches.
pub fn ordinal_of(family: ModeFamily, name: &str) -> Result<usize, UnknownMode> {
    let name = name.trim();
    family
        .names()
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(name))
        .ok_or(UnknownMode(family))
}

/// All canonical names of `family`, ordered by ordinal.
#[inline]
pub fn all_names(family: ModeFamily) -> &'static [&'static str] {
    family.names()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_every_family() {
        for family in ModeFamily::ALL {
            for i in 0..family.len() {
                let name = name_of(family, i).unwrap();
                assert_eq!(ordinal_of(family, name), Ok(i));
            }
            assert_eq!(name_of(family, family.len()), None);
        }
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(ordinal_of(ModeFamily::Stop, "BRAKE"), Ok(1));
        assert_eq!(ordinal_of(ModeFamily::Stop, "Hold\n"), Ok(2));
        assert_eq!(ordinal_of(ModeFamily::Run, "  Forever "), Ok(0));
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(
            ordinal_of(ModeFamily::Stop, "bounce"),
            Err(UnknownMode(ModeFamily::Stop))
        );
        assert!(ordinal_of(ModeFamily::Stop, "").is_err());
    }

    #[test]
    fn test_stop_mode_listing() {
        assert_eq!(all_names(ModeFamily::Stop), &["coast", "brake", "hold"]);
    }

    #[test]
    fn test_typed_lookup() {
        assert_eq!(StopMode::from_name("coast"), Ok(StopMode::Coast));
        assert_eq!(MotorType::from_name("MiniTacho"), Ok(MotorType::MiniTacho));
        assert_eq!(MotionState::Idle.name(), "idle");
        assert_eq!(MotionState::from_ordinal(9), Some(MotionState::Idle));
        assert_eq!(MotionState::from_ordinal(10), None);
    }
}
