use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::{AttributePair, Attributes};
use crate::catalog::SkillCatalog;
use crate::error::{OptimizerError, Result};
use crate::utils;

/// One entry of the training queue, resolved against the skill catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillQueueItem {
    pub skill_id: i64,
    pub target_level: i64,
    pub sp_to_finish: i64,
    pub attribute: AttributePair,
}

impl SkillQueueItem {
    pub fn new(
        skill_id: i64,
        target_level: i64,
        sp_to_finish: i64,
        attribute: AttributePair,
    ) -> Self {
        Self {
            skill_id,
            target_level,
            sp_to_finish,
            attribute,
        }
    }
}

/// A queue entry as reported by the game. Paused queues carry no dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedSkill {
    pub skill_id: i64,
    pub level: i64,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSkill {
    pub skill_id: i64,
    pub skillpoints_in_skill: i64,
}

/// Snapshot of everything the optimizer needs to know about one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSkills {
    pub character_id: i64,
    #[serde(default)]
    pub character_name: Option<String>,
    /// Remappable attributes. When `implants` is present these are the live
    /// attributes and still carry implant and accelerator bonuses.
    pub attributes: Attributes,
    #[serde(default)]
    pub implants: Option<Attributes>,
    #[serde(default)]
    pub unallocated_sp: i64,
    pub skill_queue: Vec<QueuedSkill>,
    #[serde(default)]
    pub skills: Vec<CharacterSkill>,
}

impl CharacterSkills {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&json).context("invalid snapshot")
    }

    /// The 99-point vector a remap would replace.
    pub fn base_attributes(&self) -> Attributes {
        match &self.implants {
            Some(implants) => Attributes::unboosted(&self.attributes, implants),
            None => self.attributes,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.skill_queue
            .first()
            .map_or(false, |entry| entry.finish_date.is_none())
    }

    pub fn sp_map(&self) -> HashMap<i64, i64> {
        self.skills
            .iter()
            .map(|s| (s.skill_id, s.skillpoints_in_skill))
            .collect()
    }

    /// Resolves the queue in order, deriving how much SP each entry still needs.
    pub fn queue_items<C: SkillCatalog + ?Sized>(
        &self,
        catalog: &C,
    ) -> Result<Vec<SkillQueueItem>> {
        let sp_map = self.sp_map();
        self.skill_queue
            .iter()
            .map(|entry| {
                let skill = catalog
                    .skill(entry.skill_id)
                    .ok_or(OptimizerError::UnknownSkill(entry.skill_id))?;
                let trained_sp = *sp_map.get(&entry.skill_id).unwrap_or(&0);
                let sp_to_finish = utils::sp_required(entry.level, skill.rank)?
                    - trained_sp.max(utils::sp_required(entry.level - 1, skill.rank)?);
                Ok(SkillQueueItem::new(
                    entry.skill_id,
                    entry.level,
                    sp_to_finish.max(0),
                    skill.attribute,
                ))
            })
            .collect()
    }

    /// Brings a running queue up to `now`: finished entries are removed and
    /// their skills credited, and the entry in training is credited with the
    /// SP earned since it started. Returns how many entries finished.
    pub fn advance_to<C: SkillCatalog + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        catalog: &C,
    ) -> Result<usize> {
        if self.is_paused() {
            return Ok(0);
        }

        let mut completed = 0;
        while let Some(entry) = self.skill_queue.first() {
            match entry.finish_date {
                Some(finish) if finish < now => {}
                _ => break,
            }
            let entry = self.skill_queue.remove(0);
            let skill = catalog
                .skill(entry.skill_id)
                .ok_or(OptimizerError::UnknownSkill(entry.skill_id))?;
            let sp = utils::sp_required(entry.level, skill.rank)?;
            self.set_skill_sp(entry.skill_id, sp);
            completed += 1;
        }

        let sp_map = self.sp_map();
        if let Some(entry) = self.skill_queue.first_mut() {
            if let (Some(start), Some(finish)) = (entry.start_date, entry.finish_date) {
                let span_ms = (finish - start).num_milliseconds();
                let elapsed_ms = (now - start).num_milliseconds();
                if span_ms > 0 && elapsed_ms > 0 {
                    let skill = catalog
                        .skill(entry.skill_id)
                        .ok_or(OptimizerError::UnknownSkill(entry.skill_id))?;
                    let current_sp = *sp_map.get(&entry.skill_id).unwrap_or(&0);
                    let remaining = utils::sp_required(entry.level, skill.rank)? - current_sp;
                    let gained = (remaining as f64 * elapsed_ms as f64 / span_ms as f64) as i64;
                    entry.start_date = Some(now);
                    let skill_id = entry.skill_id;
                    self.set_skill_sp(skill_id, current_sp + gained.max(0));
                }
            }
        }

        Ok(completed)
    }

    fn set_skill_sp(&mut self, skill_id: i64, sp: i64) {
        match self.skills.iter_mut().find(|s| s.skill_id == skill_id) {
            Some(skill) => skill.skillpoints_in_skill = sp,
            None => self.skills.push(CharacterSkill {
                skill_id,
                skillpoints_in_skill: sp,
            }),
        }
    }
}
