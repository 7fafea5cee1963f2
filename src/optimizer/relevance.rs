use serde::{Deserialize, Serialize};

use crate::attributes::Attribute;
use crate::skill_queue::SkillQueueItem;

/// Which of the five attributes train at least one queued skill, in
/// intelligence, memory, perception, willpower, charisma order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelevantAttributes(pub [bool; 5]);

impl RelevantAttributes {
    pub fn all() -> Self {
        Self([true; 5])
    }

    pub fn from_bitmask(mask: u8) -> Self {
        let bit = |attr: Attribute| 1u8 << (4 - attr.index());
        Self(Attribute::ALL.map(|attr| mask & bit(attr) != 0))
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.0[attribute.index()]
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&relevant| relevant)
    }
}

pub fn relevant_attributes(items: &[SkillQueueItem]) -> RelevantAttributes {
    let mask = items
        .iter()
        .fold(0u8, |mask, item| mask | item.attribute.bitmask());
    RelevantAttributes::from_bitmask(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::fixtures;

    #[test]
    fn test_relevant_attributes() {
        // Advanced Spaceship Command, Science, Leadership
        let items = vec![
            fixtures::create_item(20342, 5, 10200),
            fixtures::create_item(3402, 5, 10200),
            fixtures::create_item(3348, 5, 1),
        ];

        let mask = |items: &[SkillQueueItem]| relevant_attributes(items).0;

        assert_eq!(mask(&items[..]), [true, true, true, true, true]);
        assert_eq!(mask(&items[0..1]), [false, false, true, true, false]);
        assert_eq!(mask(&items[1..2]), [true, true, false, false, false]);
        assert_eq!(mask(&items[2..3]), [false, false, false, true, true]);
        assert_eq!(mask(&items[0..2]), [true, true, true, true, false]);
        assert_eq!(mask(&items[1..3]), [true, true, false, true, true]);
    }

    #[test]
    fn test_empty_queue_has_no_relevant_attributes() {
        let mask = relevant_attributes(&[]);
        assert!(mask.is_empty());
        assert!(!mask.contains(Attribute::Charisma));
    }
}
