use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};

use super::{SkillCategory, StaticSkill, StaticSkillData};
use crate::attributes::{Attribute, AttributePair};

const SKILL_CATEGORY_ID: i64 = 16;
const PRIMARY_ATTRIBUTE_ID: i64 = 180;
const SECONDARY_ATTRIBUTE_ID: i64 = 181;
const SKILL_RANK_ID: i64 = 275;

/// Opens an existing static data export read-only.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true);

    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open {}", db_path.display()))
}

/// Builds the skill catalog from the dogma attributes of every published skill.
pub async fn load_catalog(pool: &SqlitePool) -> Result<StaticSkillData> {
    let rows = sqlx::query(
        r#"
        SELECT
            t.type_id,
            t.group_id,
            g.name as group_name,
            t.name,
            MAX(CASE WHEN tda.attribute_id = ? THEN tda.value END) as primary_attribute,
            MAX(CASE WHEN tda.attribute_id = ? THEN tda.value END) as secondary_attribute,
            MAX(CASE WHEN tda.attribute_id = ? THEN tda.value END) as rank
        FROM sde_types t
        JOIN sde_groups g ON g.group_id = t.group_id
        LEFT JOIN sde_type_dogma_attributes tda ON tda.type_id = t.type_id
        WHERE g.category_id = ? AND t.published = 1
        GROUP BY t.type_id
        ORDER BY t.type_id
        "#,
    )
    .bind(PRIMARY_ATTRIBUTE_ID)
    .bind(SECONDARY_ATTRIBUTE_ID)
    .bind(SKILL_RANK_ID)
    .bind(SKILL_CATEGORY_ID)
    .fetch_all(pool)
    .await
    .context("failed to query skill attributes")?;

    let mut categories = BTreeMap::new();
    let mut skills = Vec::with_capacity(rows.len());

    for row in rows {
        let type_id: i64 = row.get(0);
        let group_id: i64 = row.get(1);
        let group_name: String = row.get(2);
        let name: String = row.get(3);
        let primary: Option<f64> = row.get(4);
        let secondary: Option<f64> = row.get(5);
        let rank: Option<f64> = row.get(6);

        let attribute = match (primary, secondary) {
            (Some(p), Some(s)) => attribute_pair(p as i64, s as i64),
            _ => None,
        };
        let Some(attribute) = attribute else {
            tracing::warn!(type_id, name = %name, "skipping skill without a valid attribute pair");
            continue;
        };

        categories.entry(group_id).or_insert(group_name);
        skills.push(StaticSkill {
            id: type_id,
            category_id: group_id,
            name,
            rank: rank.map(|v| v as i64).unwrap_or(1),
            attribute,
        });
    }

    tracing::debug!(
        skills = skills.len(),
        "loaded skill catalog from static data"
    );

    let categories = categories
        .into_iter()
        .map(|(id, name)| SkillCategory { id, name })
        .collect();
    Ok(StaticSkillData::new(categories, skills))
}

fn attribute_pair(primary_id: i64, secondary_id: i64) -> Option<AttributePair> {
    AttributePair::from_attributes(
        Attribute::from_dogma_id(primary_id)?,
        Attribute::from_dogma_id(secondary_id)?,
    )
}
