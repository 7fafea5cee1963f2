use thiserror::Error;

use crate::attributes::Attributes;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("skill level {level} is outside 0..=5")]
    InvalidLevel { level: i64 },

    #[error("implant grade {0} is outside 0..=5")]
    InvalidImplantGrade(u8),

    #[error("attribute pair id {0} is outside 0..=19")]
    InvalidAttributePair(u8),

    #[error("skill {0} is not in the skill catalog")]
    UnknownSkill(i64),

    #[error("no legal attribute vector exists for the relevant attributes")]
    InfeasiblePartition,

    #[error("attribute vector {0} is not a legal remap")]
    IllegalAttributes(Attributes),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
