//! Named difficulty tiers controlling engine strength.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named difficulty level mapping to a (skill level, search depth) pair.
///
/// Tiers are ordered weakest to strongest. Search depth increases strictly
/// with strength; the engine's skill level saturates at 20 for the top two
/// tiers, so depth alone separates [`Grandmaster`](SkillTier::Grandmaster)
/// from [`Legendary`](SkillTier::Legendary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTier {
    Beginner,
    Intermediate,
    Advanced,
    Master,
    Grandmaster,
    Legendary,
}

/// Error for difficulty names that do not match any tier.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid difficulty level: {0}")]
pub struct UnknownTier(pub String);

impl SkillTier {
    /// All tiers, ordered weakest to strongest.
    pub const ALL: [SkillTier; 6] = [
        SkillTier::Beginner,
        SkillTier::Intermediate,
        SkillTier::Advanced,
        SkillTier::Master,
        SkillTier::Grandmaster,
        SkillTier::Legendary,
    ];

    /// The value passed to `setoption name Skill Level`.
    pub fn skill_level(self) -> u8 {
        match self {
            SkillTier::Beginner => 0,
            SkillTier::Intermediate => 5,
            SkillTier::Advanced => 10,
            SkillTier::Master => 15,
            SkillTier::Grandmaster => 20,
            SkillTier::Legendary => 20,
        }
    }

    /// The depth used for `go depth` searches at this tier.
    pub fn search_depth(self) -> u32 {
        match self {
            SkillTier::Beginner => 5,
            SkillTier::Intermediate => 10,
            SkillTier::Advanced => 15,
            SkillTier::Master => 18,
            SkillTier::Grandmaster => 20,
            SkillTier::Legendary => 22,
        }
    }

    fn name(self) -> &'static str {
        match self {
            SkillTier::Beginner => "beginner",
            SkillTier::Intermediate => "intermediate",
            SkillTier::Advanced => "advanced",
            SkillTier::Master => "master",
            SkillTier::Grandmaster => "grandmaster",
            SkillTier::Legendary => "legendary",
        }
    }
}

impl fmt::Display for SkillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SkillTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(SkillTier::Beginner),
            "intermediate" => Ok(SkillTier::Intermediate),
            "advanced" => Ok(SkillTier::Advanced),
            "master" => Ok(SkillTier::Master),
            "grandmaster" => Ok(SkillTier::Grandmaster),
            "legendary" => Ok(SkillTier::Legendary),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_strictly_increases_with_strength() {
        for pair in SkillTier::ALL.windows(2) {
            assert!(
                pair[0].search_depth() < pair[1].search_depth(),
                "{} should search shallower than {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_skill_level_non_decreasing_and_saturating() {
        for pair in SkillTier::ALL.windows(2) {
            assert!(pair[0].skill_level() <= pair[1].skill_level());
        }
        // Top two tiers share the maximum skill level.
        assert_eq!(SkillTier::Grandmaster.skill_level(), 20);
        assert_eq!(SkillTier::Legendary.skill_level(), 20);
        assert!(SkillTier::Legendary.search_depth() > SkillTier::Grandmaster.search_depth());
    }

    #[test]
    fn test_tier_table() {
        assert_eq!(SkillTier::Beginner.skill_level(), 0);
        assert_eq!(SkillTier::Beginner.search_depth(), 5);
        assert_eq!(SkillTier::Legendary.search_depth(), 22);
    }

    #[test]
    fn test_from_str_round_trip() {
        for tier in SkillTier::ALL {
            assert_eq!(tier.to_string().parse::<SkillTier>(), Ok(tier));
        }
    }

    #[test]
    fn test_from_str_rejects_unknown_names() {
        let err = "impossible".parse::<SkillTier>().unwrap_err();
        assert_eq!(err, UnknownTier("impossible".to_string()));
        assert!(err.to_string().contains("impossible"));
    }
}
