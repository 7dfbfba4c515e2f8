#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Skill bracket of an entry.
///
/// An entry without a bracket is "TBD" and is represented as `None` in
/// `Option<SkillLevel>` columns. Variants are declared from the lowest
/// bracket upwards so that `Ord` follows seniority.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum SkillLevel {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Beginner"))]
    Beginner,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Intermediate"))]
    Intermediate,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Advanced"))]
    Advanced,
}

impl SkillLevel {
    /// All brackets, highest first.
    pub const ALL: &'static [SkillLevel] = &[Self::Advanced, Self::Intermediate, Self::Beginner];

    /// The bracket the promotion rule forces.
    pub const TOP: SkillLevel = SkillLevel::Advanced;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid skill level string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSkillLevelError {
    invalid: String,
}

impl fmt::Display for ParseSkillLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid skill level '{}'. Valid values: {}",
            self.invalid,
            SkillLevel::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseSkillLevelError {}

impl FromStr for SkillLevel {
    type Err = ParseSkillLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beginner" => Ok(Self::Beginner),
            "Intermediate" => Ok(Self::Intermediate),
            "Advanced" => Ok(Self::Advanced),
            _ => Err(ParseSkillLevelError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Whether the author's prior entries force a promotion to [`SkillLevel::TOP`].
///
/// `previous` holds the levels of the author's most recent other entries,
/// newest first. The rule fires only when exactly `streak` of them exist and
/// every one is at the top bracket.
pub fn promotion_applies(previous: &[Option<SkillLevel>], streak: usize) -> bool {
    streak > 0
        && previous.len() == streak
        && previous.iter().all(|level| *level == Some(SkillLevel::TOP))
}

/// Plurality vote over suggested levels. Ties go to the lower bracket.
///
/// Returns `None` when nobody suggested a level.
pub fn majority_level<I>(suggestions: I) -> Option<SkillLevel>
where
    I: IntoIterator<Item = SkillLevel>,
{
    let mut votes = [0usize; 3];
    for level in suggestions {
        votes[level as usize] += 1;
    }

    // Ascending scan with a strict comparison keeps the lowest bracket on ties.
    let mut winner: Option<(SkillLevel, usize)> = None;
    for level in [SkillLevel::Beginner, SkillLevel::Intermediate, SkillLevel::Advanced] {
        let count = votes[level as usize];
        if count == 0 {
            continue;
        }
        match winner {
            Some((_, best)) if best >= count => {}
            _ => winner = Some((level, count)),
        }
    }
    winner.map(|(level, _)| level)
}
