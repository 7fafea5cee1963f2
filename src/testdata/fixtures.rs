use crate::attributes::{AttributePair, Attributes};
use crate::catalog::{SkillCatalog, SkillCategory, StaticSkill, StaticSkillData};
use crate::skill_queue::{CharacterSkill, CharacterSkills, QueuedSkill, SkillQueueItem};

use super::CATALOG;

// (id, category, name, rank, attributes)
#[rustfmt::skip]
const SKILLS: &[(i64, i64, &str, i64, &str)] = &[
    (3327, 257, "Spaceship Command", 1, "perception/willpower"),
    (20342, 257, "Advanced Spaceship Command", 5, "perception/willpower"),
    (24311, 257, "Amarr Carrier", 14, "perception/willpower"),
    (3402, 270, "Science", 1, "intelligence/memory"),
    (3348, 258, "Leadership", 1, "charisma/willpower"),
    (3449, 275, "Navigation", 1, "intelligence/perception"),
];

pub fn create_catalog() -> StaticSkillData {
    let categories = vec![
        SkillCategory {
            id: 257,
            name: "Spaceship Command".to_string(),
        },
        SkillCategory {
            id: 258,
            name: "Leadership".to_string(),
        },
        SkillCategory {
            id: 270,
            name: "Science".to_string(),
        },
        SkillCategory {
            id: 275,
            name: "Navigation".to_string(),
        },
    ];

    let skills = SKILLS
        .iter()
        .map(|&(id, category_id, name, rank, attribute)| StaticSkill {
            id,
            category_id,
            name: name.to_string(),
            rank,
            attribute: attribute.parse::<AttributePair>().unwrap(),
        })
        .collect();

    StaticSkillData::new(categories, skills)
}

/// Queue item with a fixed remaining SP, trained by the catalog's attributes.
pub fn create_item(skill_id: i64, level: i64, sp_to_finish: i64) -> SkillQueueItem {
    let skill = CATALOG.skill(skill_id).unwrap();
    SkillQueueItem::new(skill_id, level, sp_to_finish, skill.attribute)
}

pub fn create_attributes(int: i64, mem: i64, per: i64, wil: i64, cha: i64) -> Attributes {
    Attributes {
        intelligence: int,
        memory: mem,
        perception: per,
        willpower: wil,
        charisma: cha,
    }
}

/// Character with a paused queue of `(skill_id, level)` entries and
/// `(skill_id, sp)` trained skills.
pub fn create_character(
    character_id: i64,
    attributes: Attributes,
    unallocated_sp: i64,
    queue: &[(i64, i64)],
    skills: &[(i64, i64)],
) -> CharacterSkills {
    CharacterSkills {
        character_id,
        character_name: None,
        attributes,
        implants: None,
        unallocated_sp,
        skill_queue: queue
            .iter()
            .map(|&(skill_id, level)| QueuedSkill {
                skill_id,
                level,
                start_date: None,
                finish_date: None,
            })
            .collect(),
        skills: skills
            .iter()
            .map(|&(skill_id, skillpoints_in_skill)| CharacterSkill {
                skill_id,
                skillpoints_in_skill,
            })
            .collect(),
    }
}
