use serde::{Deserialize, Serialize};

use crate::attributes::{AttributePair, Attributes};
use crate::error::{OptimizerError, Result};

/// Cumulative SP needed to reach each level for a rank 1 skill.
const RANK_SP: [i64; 6] = [0, 250, 1414, 8000, 45254, 256000];

pub const MAX_SKILL_LEVEL: i64 = 5;

/// Total SP a skill of `rank` holds once `level` is trained.
pub fn sp_required(level: i64, rank: i64) -> Result<i64> {
    if !(0..=MAX_SKILL_LEVEL).contains(&level) {
        return Err(OptimizerError::InvalidLevel { level });
    }
    Ok(RANK_SP[level as usize] * rank)
}

/// SP per minute for a skill trained by `pair`, before implant bonuses.
pub fn training_rate_per_minute(attributes: &Attributes, pair: AttributePair) -> f64 {
    calculate_sp_per_minute(
        attributes.get(pair.primary()),
        attributes.get(pair.secondary()),
    )
}

pub fn calculate_sp_per_minute(primary: i64, secondary: i64) -> f64 {
    primary as f64 + (secondary as f64 / 2.0)
}

/// Attribute implant set strength. Grade `n` adds `n` to every attribute, which
/// lifts any skill's SP/minute by a flat `1.5 * n`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct ImplantGrade(u8);

impl ImplantGrade {
    pub const NONE: ImplantGrade = ImplantGrade(0);
    pub const MAX: ImplantGrade = ImplantGrade(5);
    pub const ALL: [ImplantGrade; 6] = [
        ImplantGrade(0),
        ImplantGrade(1),
        ImplantGrade(2),
        ImplantGrade(3),
        ImplantGrade(4),
        ImplantGrade(5),
    ];

    pub fn grade(&self) -> u8 {
        self.0
    }

    /// Flat SP/minute bonus: `[0, 1.5, 3.0, 4.5, 6.0, 7.5]`.
    pub fn bonus(&self) -> f64 {
        self.0 as f64 * 1.5
    }
}

impl TryFrom<u8> for ImplantGrade {
    type Error = OptimizerError;

    fn try_from(grade: u8) -> Result<Self> {
        if grade <= Self::MAX.0 {
            Ok(ImplantGrade(grade))
        } else {
            Err(OptimizerError::InvalidImplantGrade(grade))
        }
    }
}

impl From<ImplantGrade> for u8 {
    fn from(grade: ImplantGrade) -> u8 {
        grade.0
    }
}
