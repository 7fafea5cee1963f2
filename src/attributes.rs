use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptimizerError;

/// Unboosted floor of every attribute.
pub const BASE_ATTRIBUTE: i64 = 17;
/// Highest value a remap may assign to a single attribute.
pub const MAX_ATTRIBUTE: i64 = 27;
/// Every remap must spend exactly this many points across the five attributes.
pub const TOTAL_ATTRIBUTE_POINTS: i64 = 99;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Intelligence,
    Memory,
    Perception,
    Willpower,
    Charisma,
}

impl Attribute {
    /// Queue order used by attribute vectors and relevance masks.
    pub const ALL: [Attribute; 5] = [
        Attribute::Intelligence,
        Attribute::Memory,
        Attribute::Perception,
        Attribute::Willpower,
        Attribute::Charisma,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Intelligence => "intelligence",
            Attribute::Memory => "memory",
            Attribute::Perception => "perception",
            Attribute::Willpower => "willpower",
            Attribute::Charisma => "charisma",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Attribute::Intelligence => "Int",
            Attribute::Memory => "Mem",
            Attribute::Perception => "Per",
            Attribute::Willpower => "Wil",
            Attribute::Charisma => "Cha",
        }
    }

    // Dogma attribute ids in the static data export:
    // Charisma: 164
    // Intelligence: 165
    // Memory: 166
    // Perception: 167
    // Willpower: 168
    pub fn dogma_id(&self) -> i64 {
        match self {
            Attribute::Charisma => 164,
            Attribute::Intelligence => 165,
            Attribute::Memory => 166,
            Attribute::Perception => 167,
            Attribute::Willpower => 168,
        }
    }

    pub fn from_dogma_id(id: i64) -> Option<Self> {
        match id {
            164 => Some(Attribute::Charisma),
            165 => Some(Attribute::Intelligence),
            166 => Some(Attribute::Memory),
            167 => Some(Attribute::Perception),
            168 => Some(Attribute::Willpower),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_plain::from_str(s).map_err(|_| ())
    }
}

/// A full attribute vector, always read in intelligence, memory, perception,
/// willpower, charisma order when flattened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Attributes {
    pub intelligence: i64,
    pub memory: i64,
    pub perception: i64,
    pub willpower: i64,
    pub charisma: i64,
}

impl Attributes {
    pub const fn new(
        intelligence: i64,
        memory: i64,
        perception: i64,
        willpower: i64,
        charisma: i64,
    ) -> Self {
        Self {
            intelligence,
            memory,
            perception,
            willpower,
            charisma,
        }
    }

    /// Every attribute at the unboosted floor. Sums to 85, so it is not itself a legal remap.
    pub const fn floor() -> Self {
        Self::new(
            BASE_ATTRIBUTE,
            BASE_ATTRIBUTE,
            BASE_ATTRIBUTE,
            BASE_ATTRIBUTE,
            BASE_ATTRIBUTE,
        )
    }

    pub fn get(&self, attribute: Attribute) -> i64 {
        match attribute {
            Attribute::Intelligence => self.intelligence,
            Attribute::Memory => self.memory,
            Attribute::Perception => self.perception,
            Attribute::Willpower => self.willpower,
            Attribute::Charisma => self.charisma,
        }
    }

    pub fn to_array(&self) -> [i64; 5] {
        [
            self.intelligence,
            self.memory,
            self.perception,
            self.willpower,
            self.charisma,
        ]
    }

    pub fn from_array(values: [i64; 5]) -> Self {
        let [intelligence, memory, perception, willpower, charisma] = values;
        Self::new(intelligence, memory, perception, willpower, charisma)
    }

    pub fn sum(&self) -> i64 {
        self.to_array().iter().sum()
    }

    /// Every component within [17, 27] and the full 99-point pool spent.
    pub fn is_legal(&self) -> bool {
        self.to_array()
            .iter()
            .all(|v| (BASE_ATTRIBUTE..=MAX_ATTRIBUTE).contains(v))
            && self.sum() == TOTAL_ATTRIBUTE_POINTS
    }

    /// Strips implant bonuses and the accelerator bonus (spread evenly over all
    /// five attributes) from a character's live attributes.
    pub fn unboosted(current: &Attributes, implants: &Attributes) -> Self {
        let mut remainders = [0i64; 5];
        for (idx, (total, implant)) in current
            .to_array()
            .iter()
            .zip(implants.to_array())
            .enumerate()
        {
            remainders[idx] = total - implant;
        }

        let remainder_sum: i64 = remainders.iter().sum();
        let accelerator = (remainder_sum - TOTAL_ATTRIBUTE_POINTS) / 5;

        Self::from_array(remainders.map(|remainder| remainder - accelerator))
    }
}

impl TryFrom<[i64; 5]> for Attributes {
    type Error = OptimizerError;

    fn try_from(values: [i64; 5]) -> Result<Self, Self::Error> {
        let attributes = Self::from_array(values);
        if attributes.is_legal() {
            Ok(attributes)
        } else {
            Err(OptimizerError::IllegalAttributes(attributes))
        }
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Attribute::ALL
            .iter()
            .map(|attr| format!("{}:{}", attr.short_name(), self.get(*attr)))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl FromStr for Attributes {
    type Err = String;

    /// Parses `"27,21,17,17,17"` (intelligence first) into a legal vector.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid attribute value: {}", e))?;
        let values: [i64; 5] = values
            .try_into()
            .map_err(|v: Vec<i64>| format!("expected 5 values, got {}", v.len()))?;
        Attributes::try_from(values).map_err(|e| e.to_string())
    }
}

use Attribute::{
    Charisma as CHA, Intelligence as INT, Memory as MEM, Perception as PER, Willpower as WIL,
};

const ATTRIBUTE_PAIRS: [(Attribute, Attribute); 20] = [
    (INT, MEM),
    (INT, PER),
    (INT, WIL),
    (INT, CHA),
    (MEM, INT),
    (MEM, PER),
    (MEM, WIL),
    (MEM, CHA),
    (PER, INT),
    (PER, MEM),
    (PER, WIL),
    (PER, CHA),
    (WIL, INT),
    (WIL, MEM),
    (WIL, PER),
    (WIL, CHA),
    (CHA, INT),
    (CHA, MEM),
    (CHA, PER),
    (CHA, WIL),
];

// Bit 4 is intelligence, bit 0 is charisma.
#[rustfmt::skip]
const ATTRIBUTE_BITMASKS: [u8; 20] = [
    0b11000, 0b10100, 0b10010, 0b10001, // int
    0b11000, 0b01100, 0b01010, 0b01001, // mem
    0b10100, 0b01100, 0b00110, 0b00101, // per
    0b10010, 0b01010, 0b00110, 0b00011, // wil
    0b10001, 0b01001, 0b00101, 0b00011, // cha
];

/// The (primary, secondary) attribute pair a skill trains with, identified by
/// its catalog attribute type id 0..=19.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct AttributePair(u8);

impl AttributePair {
    pub const COUNT: u8 = 20;

    pub fn all() -> impl Iterator<Item = AttributePair> {
        (0..Self::COUNT).map(AttributePair)
    }

    pub fn from_attributes(primary: Attribute, secondary: Attribute) -> Option<Self> {
        ATTRIBUTE_PAIRS
            .iter()
            .position(|&(p, s)| p == primary && s == secondary)
            .map(|idx| AttributePair(idx as u8))
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn primary(&self) -> Attribute {
        ATTRIBUTE_PAIRS[self.0 as usize].0
    }

    pub fn secondary(&self) -> Attribute {
        ATTRIBUTE_PAIRS[self.0 as usize].1
    }

    pub fn bitmask(&self) -> u8 {
        ATTRIBUTE_BITMASKS[self.0 as usize]
    }
}

impl TryFrom<u8> for AttributePair {
    type Error = OptimizerError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        if id < Self::COUNT {
            Ok(AttributePair(id))
        } else {
            Err(OptimizerError::InvalidAttributePair(id))
        }
    }
}

impl From<AttributePair> for u8 {
    fn from(pair: AttributePair) -> u8 {
        pair.0
    }
}

impl fmt::Display for AttributePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.primary(), self.secondary())
    }
}

impl FromStr for AttributePair {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (primary, secondary) = s.split_once('/').ok_or(())?;
        AttributePair::from_attributes(primary.trim().parse()?, secondary.trim().parse()?)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::fixtures;

    #[test]
    fn test_pair_table_matches_bitmasks() {
        for pair in AttributePair::all() {
            assert_ne!(pair.primary(), pair.secondary());
            let expected =
                (1u8 << (4 - pair.primary().index())) | (1u8 << (4 - pair.secondary().index()));
            assert_eq!(pair.bitmask(), expected, "pair {}", pair);
        }
    }

    #[test]
    fn test_pair_round_trips_through_name() {
        let pair: AttributePair = "perception/willpower".parse().unwrap();
        assert_eq!(pair.id(), 10);
        assert_eq!(pair.primary(), Attribute::Perception);
        assert_eq!(pair.secondary(), Attribute::Willpower);
        assert_eq!(pair.to_string(), "perception/willpower");
        assert!("perception/perception".parse::<AttributePair>().is_err());
        assert!("luck/willpower".parse::<AttributePair>().is_err());
    }

    #[test]
    fn test_pair_rejects_out_of_range_id() {
        assert_eq!(
            AttributePair::try_from(20),
            Err(OptimizerError::InvalidAttributePair(20))
        );
        let parsed: Result<AttributePair, _> = serde_json::from_str("19");
        assert_eq!(parsed.unwrap().to_string(), "charisma/willpower");
        assert!(serde_json::from_str::<AttributePair>("42").is_err());
    }

    #[test]
    fn test_legality() {
        assert!(fixtures::create_attributes(27, 21, 17, 17, 17).is_legal());
        assert!(!Attributes::floor().is_legal());
        assert!(!fixtures::create_attributes(28, 20, 17, 17, 17).is_legal());
        assert!(!fixtures::create_attributes(27, 21, 17, 17, 16).is_legal());
        assert!("27,21,17,17,17".parse::<Attributes>().is_ok());
        assert!("27,21,17,17".parse::<Attributes>().is_err());
        assert!("27,21,17,17,18".parse::<Attributes>().is_err());
    }

    #[test]
    fn test_unboosted_strips_implants_and_accelerator() {
        // +4 implants everywhere and a +2 accelerator on top of a 27/21/17/17/17 remap
        let current = fixtures::create_attributes(33, 27, 23, 23, 23);
        let implants = fixtures::create_attributes(4, 4, 4, 4, 4);

        let base = Attributes::unboosted(&current, &implants);
        assert_eq!(base, fixtures::create_attributes(27, 21, 17, 17, 17));
        assert!(base.is_legal());
    }

    #[test]
    fn test_dogma_ids() {
        for attr in Attribute::ALL {
            assert_eq!(Attribute::from_dogma_id(attr.dogma_id()), Some(attr));
            assert_eq!(attr.as_str().parse::<Attribute>(), Ok(attr));
        }
        assert_eq!(Attribute::from_dogma_id(180), None);
    }
}
