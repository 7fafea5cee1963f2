pub mod sde;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::attributes::AttributePair;

/// Static per-skill data the optimizer reads: rank and training attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticSkill {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub rank: i64,
    pub attribute: AttributePair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub id: i64,
    pub name: String,
}

pub trait SkillCatalog {
    fn skill(&self, skill_id: i64) -> Option<&StaticSkill>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SkillCatalogFile {
    categories: Vec<SkillCategory>,
    skills: Vec<StaticSkill>,
}

/// In-memory skill catalog, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct StaticSkillData {
    skills: HashMap<i64, StaticSkill>,
    categories: Vec<SkillCategory>,
}

impl StaticSkillData {
    pub fn new(categories: Vec<SkillCategory>, skills: Vec<StaticSkill>) -> Self {
        Self {
            skills: skills.into_iter().map(|s| (s.id, s)).collect(),
            categories,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: SkillCatalogFile = serde_json::from_str(json).context("invalid skill catalog")?;
        Ok(Self::new(file.categories, file.skills))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn categories(&self) -> &[SkillCategory] {
        &self.categories
    }

    pub fn category(&self, category_id: i64) -> Option<&SkillCategory> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Skills of one category, sorted by name.
    pub fn skills_in_category(&self, category_id: i64) -> Vec<&StaticSkill> {
        let mut skills: Vec<&StaticSkill> = self
            .skills
            .values()
            .filter(|s| s.category_id == category_id)
            .collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        skills
    }
}

impl SkillCatalog for StaticSkillData {
    fn skill(&self, skill_id: i64) -> Option<&StaticSkill> {
        self.skills.get(&skill_id)
    }
}
