pub mod attributes;
pub mod catalog;
pub mod config;
pub mod error;
pub mod optimizer;
pub mod report;
pub mod service;
pub mod skill_queue;
pub mod utils;

#[cfg(test)]
mod testdata;

pub use attributes::{Attribute, AttributePair, Attributes};
pub use catalog::{SkillCatalog, StaticSkill, StaticSkillData};
pub use error::OptimizerError;
pub use optimizer::{AttributeMapping, OptimizationResult, Optimizer};
pub use skill_queue::{CharacterSkills, SkillQueueItem};
pub use utils::ImplantGrade;
