//! Engine playing strength.

use crate::EngineError;
use std::fmt;

/// Value of the engine's `Skill Level` option, always within `0..=20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SkillLevel(u8);

impl SkillLevel {
    /// Weakest level.
    pub const MIN: SkillLevel = SkillLevel(0);
    /// Strongest level.
    pub const MAX: SkillLevel = SkillLevel(20);

    /// Creates a skill level, rejecting values above 20.
    pub fn new(level: u8) -> Result<Self, EngineError> {
        Self::try_from(i64::from(level))
    }

    /// Returns the raw level.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for SkillLevel {
    fn default() -> Self {
        SkillLevel(5)
    }
}

impl TryFrom<i64> for SkillLevel {
    type Error = EngineError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN.0)..=i64::from(Self::MAX.0)).contains(&level) {
            Ok(SkillLevel(level as u8))
        } else {
            Err(EngineError::InvalidSkillLevel(level))
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
