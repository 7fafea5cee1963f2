use lazy_static::lazy_static;

use crate::catalog::StaticSkillData;

pub mod fixtures;

lazy_static! {
    /// Catalog holding every skill the fixtures refer to.
    pub static ref CATALOG: StaticSkillData = fixtures::create_catalog();
}
