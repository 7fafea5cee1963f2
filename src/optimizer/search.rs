use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::duration::{bounded_total, calculate_queue_duration, queue_durations};
use super::relevance::{relevant_attributes, RelevantAttributes};
use crate::attributes::{
    Attribute, Attributes, BASE_ATTRIBUTE, MAX_ATTRIBUTE, TOTAL_ATTRIBUTE_POINTS,
};
use crate::error::{OptimizerError, Result};
use crate::skill_queue::SkillQueueItem;
use crate::utils::ImplantGrade;

/// A contiguous run of the queue trained under one attribute vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub items: Vec<SkillQueueItem>,
    pub attributes: Attributes,
    pub duration: f64,
    pub relevant_attributes: RelevantAttributes,
}

impl Segment {
    pub fn new(items: Vec<SkillQueueItem>, attributes: Attributes, duration: f64) -> Self {
        let relevant_attributes = relevant_attributes(&items);
        Self {
            items,
            attributes,
            duration,
            relevant_attributes,
        }
    }

    /// A segment whose duration is the queue trained under `attributes` at `implant`.
    pub fn from_queue(
        items: Vec<SkillQueueItem>,
        attributes: Attributes,
        implant: ImplantGrade,
    ) -> Self {
        let duration = calculate_queue_duration(&items, &attributes, implant);
        Self::new(items, attributes, duration)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentOptimum {
    pub best_attributes: Attributes,
    pub best_duration: f64,
}

/// Best vector found so far, with whatever the evaluation produced alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent<T> {
    pub attributes: Attributes,
    pub duration: f64,
    pub payload: T,
}

/// Values one attribute may take: the floor only when it trains nothing,
/// otherwise up to `room` capped at the attribute maximum.
fn attribute_range(relevant: bool, room: i64) -> RangeInclusive<i64> {
    let upper = if relevant {
        room.min(MAX_ATTRIBUTE)
    } else {
        BASE_ATTRIBUTE
    };
    BASE_ATTRIBUTE..=upper
}

/// The most one attribute can take once every later one sits at the floor.
fn room(used: i64, remaining_after: i64) -> i64 {
    TOTAL_ATTRIBUTE_POINTS - used - BASE_ATTRIBUTE * remaining_after
}

/// Completes a vector by giving charisma what is left of the pool.
fn candidate(mask: RelevantAttributes, head: [i64; 3], willpower: i64) -> Option<Attributes> {
    let [intelligence, memory, perception] = head;
    let charisma = TOTAL_ATTRIBUTE_POINTS - (intelligence + memory + perception + willpower);
    if !mask.contains(Attribute::Charisma) && charisma > BASE_ATTRIBUTE {
        return None;
    }
    let attributes = Attributes::new(intelligence, memory, perception, willpower, charisma);
    attributes.is_legal().then_some(attributes)
}

/// Every legal remap, with attributes outside `mask` pinned to the floor.
///
/// Intelligence varies slowest and willpower fastest; charisma takes whatever
/// is left of the pool.
pub fn legal_attributes(mask: RelevantAttributes) -> impl Iterator<Item = Attributes> {
    let ints = attribute_range(mask.contains(Attribute::Intelligence), MAX_ATTRIBUTE);
    ints.flat_map(move |int| {
        let mems = attribute_range(mask.contains(Attribute::Memory), room(int, 3));
        mems.flat_map(move |mem| {
            let pers = attribute_range(mask.contains(Attribute::Perception), room(int + mem, 2));
            pers.flat_map(move |per| {
                let head = [int, mem, per];
                let used = int + mem + per;
                let wils = attribute_range(mask.contains(Attribute::Willpower), room(used, 1));
                wils.filter_map(move |wil| candidate(mask, head, wil))
            })
        })
    })
}

/// Folds candidates into the best one. `evaluate` receives the incumbent's
/// duration as a bound and returns `None` once a candidate is known to exceed
/// it; only strictly shorter durations replace the incumbent.
pub fn search<I, T, F>(
    candidates: I,
    incumbent: Incumbent<T>,
    mut evaluate: F,
) -> Result<Incumbent<T>>
where
    I: IntoIterator<Item = Attributes>,
    F: FnMut(&Attributes, f64) -> Option<(f64, T)>,
{
    let mut considered = 0usize;
    let mut pruned = 0usize;

    let best = candidates
        .into_iter()
        .inspect(|_| considered += 1)
        .fold(incumbent, |best, attributes| match evaluate(&attributes, best.duration) {
            Some((duration, payload)) if duration < best.duration => Incumbent {
                attributes,
                duration,
                payload,
            },
            Some(_) => best,
            None => {
                pruned += 1;
                best
            }
        });

    if considered == 0 {
        return Err(OptimizerError::InfeasiblePartition);
    }

    tracing::debug!(considered, pruned, best = %best.attributes, "attribute search finished");
    Ok(best)
}

/// Searches the legal vectors over the segment's relevant attributes, starting
/// from `incumbent`. `evaluate` decides what a candidate costs and what it
/// carries along, such as an SP allocation.
pub fn optimize_segment_with<T, F>(
    segment: &Segment,
    incumbent: Incumbent<T>,
    evaluate: F,
) -> Result<Incumbent<T>>
where
    F: FnMut(&Attributes, f64) -> Option<(f64, T)>,
{
    let candidates = legal_attributes(segment.relevant_attributes);
    search(candidates, incumbent, evaluate)
}

/// Finds the attribute vector that clears the segment fastest at `implant`,
/// starting from the segment's own vector and duration. This is the
/// allocation-free form: plain training time, no unallocated SP.
pub fn optimize_segment(segment: &Segment, implant: ImplantGrade) -> Result<SegmentOptimum> {
    let incumbent = Incumbent {
        attributes: segment.attributes,
        duration: segment.duration,
        payload: (),
    };

    let best = optimize_segment_with(segment, incumbent, |attributes, bound| {
        let durations = queue_durations(&segment.items, attributes, implant);
        bounded_total(durations, bound).map(|d| (d, ()))
    })?;

    Ok(SegmentOptimum {
        best_attributes: best.attributes,
        best_duration: best.duration,
    })
}
